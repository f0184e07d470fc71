//! URL slugs for catalog rows: transliterated, lower-case, hyphenated and
//! unique within their table.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityName, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::debug;

use crate::errors::ServiceError;

const MAX_SLUG_LEN: usize = 240;

fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        'а' => "a", 'б' => "b", 'в' => "v", 'г' => "g", 'д' => "d", 'е' => "e", 'ё' => "io",
        'ж' => "zh", 'з' => "z", 'и' => "i", 'й' => "i", 'к' => "k", 'л' => "l", 'м' => "m",
        'н' => "n", 'о' => "o", 'п' => "p", 'р' => "r", 'с' => "s", 'т' => "t", 'у' => "u",
        'ф' => "f", 'х' => "kh", 'ц' => "ts", 'ч' => "ch", 'ш' => "sh", 'щ' => "shch", 'ъ' => "",
        'ы' => "y", 'ь' => "", 'э' => "e", 'ю' => "iu", 'я' => "ia",
        _ => return deunicode::deunicode_char(ch),
    };
    Some(s)
}

fn push_ascii(slug: &mut String, last_was_dash: &mut bool, ch: char) {
    if ch.is_ascii_alphanumeric() {
        slug.push(ch.to_ascii_lowercase());
        *last_was_dash = false;
    } else if !slug.is_empty() && !*last_was_dash {
        slug.push('-');
        *last_was_dash = true;
    }
}

pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut last_was_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii() {
            push_ascii(&mut slug, &mut last_was_dash, ch);
        } else if let Some(latin) = transliterate(ch) {
            // apostrophes from the fallback table are dropped, not turned into dashes
            for c in latin.chars().filter(|c| *c != '\'' && *c != '"') {
                push_ascii(&mut slug, &mut last_was_dash, c);
            }
        } else {
            push_ascii(&mut slug, &mut last_was_dash, ' ');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Slug for `name` that no row of `E` uses yet in `column`; collisions get
/// `-1`, `-2`, ... appended.
pub async fn unique_slug<E, C>(db: &C, name: &str, column: E::Column) -> Result<String, ServiceError>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let mut base = slugify(name);
    if base.is_empty() {
        base = "item".to_string();
    }
    let mut candidate = base.clone();
    let mut counter = 1u32;
    while E::find().filter(column.eq(candidate.clone())).count(db).await? > 0 {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(candidate)
}

/// Inserts `am` with a unique slug for `name` written into `column`.
///
/// The slug is chosen and inserted inside one transaction holding a
/// `SHARE ROW EXCLUSIVE` lock on the table, so concurrent creates with the
/// same name queue up and each sees the rows committed before it.
pub async fn insert_with_unique_slug<A>(
    db: &DatabaseConnection,
    name: &str,
    column: <A::Entity as EntityTrait>::Column,
    mut am: A,
) -> Result<<A::Entity as EntityTrait>::Model, ServiceError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A> + Sync,
{
    let table = A::Entity::default().table_name().to_string();
    let txn = db.begin().await?;
    txn.execute_unprepared(&format!(r#"LOCK TABLE "{table}" IN SHARE ROW EXCLUSIVE MODE"#)).await?;
    let slug = unique_slug::<A::Entity, _>(&txn, name, column).await?;
    debug!(%table, %slug, "slug reserved");
    am.set(column, slug.into());
    let created = am.insert(&txn).await?;
    txn.commit().await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_cases() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Men's  cut!! "), "men-s-cut");
        assert_eq!(slugify("foo/bar\\baz"), "foo-bar-baz");
    }

    #[test]
    fn slugify_transliterates_cyrillic() {
        assert_eq!(slugify("Стрижка"), "strizhka");
        assert_eq!(slugify("Мужская стрижка"), "muzhskaia-strizhka");
        assert_eq!(slugify("Окрашивание волос 2024"), "okrashivanie-volos-2024");
        assert_eq!(slugify("Щётка"), "shchiotka");
        assert_eq!(slugify("Подъезд"), "podezd");
    }

    #[test]
    fn slugify_transliterates_other_scripts() {
        assert_eq!(slugify("Crème brûlée"), "creme-brulee");
        assert_eq!(slugify("Straße Łódź"), "strasse-lodz");
        assert_eq!(slugify("北京"), "bei-jing");
    }

    #[test]
    fn slugify_is_deterministic_and_bounded() {
        assert_eq!(slugify("Маникюр"), slugify("Маникюр"));
        let long = "a".repeat(300);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
        assert_eq!(slugify("!!!"), "");
    }
}
