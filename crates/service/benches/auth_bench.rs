use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::service::{AuthService, AuthConfig};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::domain::{RegisterInput, LoginInput};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("secret"));

    // pre-create the account outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput {
        email: "bench@salon.example.com".into(),
        name: "Bench".into(),
        password: "Benchmark1".into(),
        is_staff: true,
    }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let input = LoginInput { login: "bench@salon.example.com".into(), password: "Benchmark1".into() };
            rt.block_on(svc.login(input)).unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
