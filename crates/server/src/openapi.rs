//! OpenAPI document. The `*Doc` types only describe payloads; handlers work
//! with the service-layer types.

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest {
    /// email
    pub login: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct RefreshRequest { pub refresh_token: String }

#[derive(ToSchema)]
pub struct TokenPairDoc { pub access_token: String, pub refresh_token: String }

#[derive(ToSchema)]
pub struct ServiceTypeDoc {
    pub name: String,
    pub description: String,
    pub client_types: Vec<String>,
    pub main_image: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub benefits: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    pub benefits_images: Vec<serde_json::Value>,
    pub target: String,
    pub products: Vec<i32>,
}

#[derive(ToSchema)]
pub struct ServiceDoc {
    pub name: String,
    /// service type id
    pub service_type: i32,
    pub description: Option<String>,
    pub price_from: Option<i32>,
    pub price_to: Option<i32>,
    #[schema(value_type = Vec<Object>)]
    pub main_images: Vec<serde_json::Value>,
    pub duration: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub steps: Vec<serde_json::Value>,
    pub target: String,
    pub client_types: Vec<String>,
}

#[derive(ToSchema)]
pub struct MasterDoc {
    pub name: String,
    pub image: Option<String>,
    pub job_title: String,
    pub favorite_product: Option<i32>,
    pub experience: i32,
    pub service_types_ids: Vec<i32>,
}

#[derive(ToSchema)]
pub struct ProductDoc {
    pub brand: String,
    pub name: String,
    pub image: Option<String>,
    pub purpose: String,
}

#[derive(ToSchema)]
pub struct PortfolioDoc {
    pub image: String,
    /// `{"name": ...}` plus free-form fields
    #[schema(value_type = Object)]
    pub master: serde_json::Value,
    pub service_type: i32,
    pub service: i32,
}

#[derive(ToSchema)]
pub struct ContactDoc {
    pub email: String,
    pub phones: Vec<String>,
    pub instagram: String,
    pub telegram: String,
    pub whatsapp: String,
    /// `[{"week_day": ..., "hours": ...}]`
    #[schema(value_type = Vec<Object>)]
    pub schedule: Vec<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub original_image: Vec<u8>,
    /// default true
    pub compress: Option<bool>,
    /// default false
    pub crop: Option<bool>,
}

#[derive(ToSchema)]
pub struct ImageCreatedDoc {
    pub id: i32,
    pub original_url: String,
    pub image_url: String,
    pub cropped_url: String,
    /// True only when the compressed WebP copy was written. Stays false when
    /// compression was requested but processing failed.
    pub is_compressed: bool,
    /// True only when the 600×600 WebP crop was written. Stays false when
    /// cropping was requested but processing failed.
    pub is_cropped: bool,
}

#[derive(ToSchema)]
pub struct QuoteDoc {
    pub author: Option<String>,
    pub text: String,
}

#[derive(ToSchema)]
pub struct RandomQuoteDoc { pub author: String, pub text: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::service_types::list,
        crate::routes::service_types::create,
        crate::routes::service_types::get,
        crate::routes::service_types::replace,
        crate::routes::service_types::patch,
        crate::routes::service_types::delete,
        crate::routes::services::list,
        crate::routes::services::create,
        crate::routes::services::get,
        crate::routes::services::replace,
        crate::routes::services::patch,
        crate::routes::services::delete,
        crate::routes::masters::list,
        crate::routes::masters::create,
        crate::routes::masters::get,
        crate::routes::masters::replace,
        crate::routes::masters::patch,
        crate::routes::masters::delete,
        crate::routes::products::list,
        crate::routes::products::create,
        crate::routes::products::get,
        crate::routes::products::delete,
        crate::routes::portfolio::list,
        crate::routes::portfolio::create,
        crate::routes::portfolio::get,
        crate::routes::portfolio::replace,
        crate::routes::portfolio::patch,
        crate::routes::portfolio::delete,
        crate::routes::contacts::get,
        crate::routes::contacts::create,
        crate::routes::contacts::replace,
        crate::routes::contacts::patch,
        crate::routes::images::upload,
        crate::routes::images::list,
        crate::routes::images::get,
        crate::routes::images::delete,
        crate::routes::quotes::random_quote,
        crate::routes::quotes::list,
        crate::routes::quotes::create,
        crate::routes::quotes::get,
        crate::routes::quotes::delete,
        crate::routes::quotes::daily,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            RefreshRequest,
            TokenPairDoc,
            ServiceTypeDoc,
            ServiceDoc,
            MasterDoc,
            ProductDoc,
            PortfolioDoc,
            ContactDoc,
            ImageUploadForm,
            ImageCreatedDoc,
            QuoteDoc,
            RandomQuoteDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "service_types"),
        (name = "services"),
        (name = "masters"),
        (name = "products"),
        (name = "portfolio"),
        (name = "contacts"),
        (name = "images"),
        (name = "quotes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_management_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/auth/", "/api/services/{id}/", "/api/contacts/", "/api/random-quote/", "/api/quotes/daily/"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn image_flags_describe_processing_outcome() -> anyhow::Result<()> {
        let doc = serde_json::to_value(ApiDoc::openapi())?;
        let props = &doc["components"]["schemas"]["ImageCreatedDoc"]["properties"];
        for flag in ["is_compressed", "is_cropped"] {
            let description = props[flag]["description"].as_str().unwrap_or_default();
            assert!(description.contains("processing failed"), "{flag}: {description:?}");
        }
        Ok(())
    }
}
