use std::sync::Arc;

use common::metrics::{LOGINS_TOTAL, LOGIN_FAILURES_TOTAL, REGISTRATIONS_TOTAL, REGISTRATION_REJECTIONS_TOTAL};
use once_cell::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::domain::{CustomerView, LoginInput, NewCustomer, RefreshInput, RegisterInput, TokenPair};
use super::errors::CustomerError;
use super::password::PasswordEncoder;
use super::repository::CustomerRepository;
use super::token::{TokenIssuer, TokenKind};
use super::validation;

/// Customer sign-up and login service, independent of web framework.
///
/// Collaborators are handed in explicitly; `R` may be `dyn CustomerRepository`.
pub struct CustomerService<R: CustomerRepository + ?Sized> {
    repo: Arc<R>,
    encoder: Arc<dyn PasswordEncoder>,
    tokens: Arc<dyn TokenIssuer>,
    /// Digest checked when the phone is unknown, so both login failures cost one verify.
    decoy_hash: OnceCell<String>,
}

impl<R: CustomerRepository + ?Sized> CustomerService<R> {
    pub fn new(repo: Arc<R>, encoder: Arc<dyn PasswordEncoder>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { repo, encoder, tokens, decoy_hash: OnceCell::new() }
    }

    /// Register a new customer with a hashed password.
    ///
    /// Rules run in order: input validation, phone uniqueness, phone verification.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::customer::{CustomerService, domain::RegisterInput};
    /// use service::customer::repository::mock::InMemoryCustomerRepository;
    /// use service::customer::password::Argon2PasswordEncoder;
    /// use service::customer::token::{JwtConfig, JwtTokenIssuer};
    ///
    /// let tokens = JwtTokenIssuer::new(&JwtConfig { secret: "s".into(), issuer: "bbang".into(), access_ttl_secs: 60, refresh_ttl_secs: 600 });
    /// let svc = CustomerService::new(
    ///     Arc::new(InMemoryCustomerRepository::default()),
    ///     Arc::new(Argon2PasswordEncoder::default()),
    ///     Arc::new(tokens),
    /// );
    /// let input = RegisterInput { nickname: Some("baker".into()), phone: "01012345678".into(), password: "bread123!".into(), phone_verified: Some(true) };
    /// let view = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(view.phone, "01012345678");
    /// ```
    #[instrument(skip(self, input), fields(phone = %input.phone))]
    pub async fn register(&self, input: RegisterInput) -> Result<CustomerView, CustomerError> {
        let res = self.try_register(input).await;
        match &res {
            Ok(_) => REGISTRATIONS_TOTAL.inc(),
            Err(e) => {
                REGISTRATION_REJECTIONS_TOTAL.with_label_values(&[e.reason()]).inc();
                debug!(error = %e, "registration rejected");
            }
        }
        res
    }

    async fn try_register(&self, input: RegisterInput) -> Result<CustomerView, CustomerError> {
        validation::check(&input)?;

        if self.repo.exists_by_phone(&input.phone).await? {
            return Err(CustomerError::DuplicatePhone);
        }
        if input.phone_verified != Some(true) {
            return Err(CustomerError::UnverifiedPhone);
        }

        let nickname = input
            .nickname
            .ok_or_else(|| CustomerError::Validation("nickname: nickname cannot be null".into()))?;
        let password_hash = self.encoder.hash(&input.password)?;
        let saved = self
            .repo
            .save(NewCustomer { phone: input.phone, nickname, password_hash, phone_verified: true })
            .await?;
        info!(customer_id = %saved.id, "customer_registered");
        Ok(CustomerView::from(&saved))
    }

    /// Check credentials and issue an access/refresh token pair.
    #[instrument(skip(self, input), fields(phone = %input.phone))]
    pub async fn login(&self, input: LoginInput) -> Result<TokenPair, CustomerError> {
        let res = self.try_login(input).await;
        match &res {
            Ok(_) => LOGINS_TOTAL.inc(),
            Err(e) if e.is_client_error() => {
                LOGIN_FAILURES_TOTAL.inc();
                debug!(error = %e, "login rejected");
            }
            Err(e) => warn!(error = %e, "login failed"),
        }
        res
    }

    async fn try_login(&self, input: LoginInput) -> Result<TokenPair, CustomerError> {
        validation::check(&input)?;

        let Some(customer) = self.repo.find_by_phone(&input.phone).await? else {
            let decoy = self.decoy_hash.get_or_try_init(|| self.encoder.hash("decoy-password-1!"))?;
            let _ = self.encoder.verify(&input.password, decoy);
            return Err(CustomerError::Unauthorized);
        };
        if !self.encoder.verify(&input.password, &customer.password_hash)? {
            return Err(CustomerError::Unauthorized);
        }

        let pair = self.tokens.issue(&customer)?;
        info!(customer_id = %customer.id, "customer_logged_in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair, provided the customer still exists.
    #[instrument(skip_all)]
    pub async fn refresh(&self, input: RefreshInput) -> Result<TokenPair, CustomerError> {
        let claims = self.tokens.verify(&input.refresh_token, TokenKind::Refresh)?;
        let customer = self
            .repo
            .find_by_phone(&claims.sub)
            .await?
            .ok_or(CustomerError::Unauthorized)?;
        self.tokens.issue(&customer)
    }

    /// Resolve a verified access token to the customer's public view.
    #[instrument(skip_all)]
    pub async fn current(&self, access_token: &str) -> Result<CustomerView, CustomerError> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;
        let customer = self
            .repo
            .find_by_phone(&claims.sub)
            .await?
            .ok_or(CustomerError::Unauthorized)?;
        Ok(CustomerView::from(&customer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::customer::domain::Customer;
    use crate::customer::password::Argon2PasswordEncoder;
    use crate::customer::repository::mock::InMemoryCustomerRepository;
    use crate::customer::token::{Claims, JwtConfig, JwtTokenIssuer};

    const PHONE: &str = "01012345678";

    fn register_input(verified: Option<bool>) -> RegisterInput {
        RegisterInput {
            nickname: Some("baker".into()),
            phone: PHONE.into(),
            password: "bread123!".into(),
            phone_verified: verified,
        }
    }

    fn jwt() -> Arc<JwtTokenIssuer> {
        Arc::new(JwtTokenIssuer::new(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "bbang-test".into(),
            access_ttl_secs: 600,
            refresh_ttl_secs: 3600,
        }))
    }

    fn service_with<R: CustomerRepository>(repo: Arc<R>) -> CustomerService<R> {
        CustomerService::new(repo, Arc::new(Argon2PasswordEncoder::default()), jwt())
    }

    /// Counts calls and can pretend the phone is free to simulate a racing sign-up.
    #[derive(Default)]
    struct RecordingRepo {
        inner: InMemoryCustomerRepository,
        saves: AtomicUsize,
        blind_exists: bool,
    }

    #[async_trait]
    impl CustomerRepository for RecordingRepo {
        async fn exists_by_phone(&self, phone: &str) -> Result<bool, CustomerError> {
            if self.blind_exists {
                return Ok(false);
            }
            self.inner.exists_by_phone(phone).await
        }

        async fn save(&self, customer: NewCustomer) -> Result<Customer, CustomerError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(customer).await
        }

        async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerError> {
            self.inner.find_by_phone(phone).await
        }
    }

    struct FixedIssuer;

    impl TokenIssuer for FixedIssuer {
        fn issue(&self, _customer: &Customer) -> Result<TokenPair, CustomerError> {
            Ok(TokenPair { access_token: "testAccessToken".into(), refresh_token: "testRefreshToken".into() })
        }

        fn verify(&self, _token: &str, _kind: TokenKind) -> Result<Claims, CustomerError> {
            Err(CustomerError::Unauthorized)
        }
    }

    #[tokio::test]
    async fn save_and_return_customer() {
        let repo = Arc::new(InMemoryCustomerRepository::default());
        let svc = service_with(repo.clone());

        let view = svc.register(register_input(Some(true))).await.unwrap();
        assert_eq!(view, CustomerView { nickname: "baker".into(), phone: PHONE.into() });

        let stored = repo.find_by_phone(PHONE).await.unwrap().unwrap();
        assert!(stored.phone_verified);
        assert_ne!(stored.password_hash, "bread123!");
        assert!(Argon2PasswordEncoder::default().verify("bread123!", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn fail_when_save_duplicated_phone() {
        let repo = Arc::new(RecordingRepo::default());
        let svc = service_with(repo.clone());
        svc.register(register_input(Some(true))).await.unwrap();

        let mut again = register_input(Some(true));
        again.nickname = Some("someone-else".into());
        let err = svc.register(again).await.unwrap_err();
        assert_eq!(err.to_string(), "phone number already exists");
        assert_eq!(repo.saves.load(Ordering::SeqCst), 1, "duplicate check must precede the write");
    }

    #[tokio::test]
    async fn duplicate_phone_wins_over_unverified_phone() {
        let repo = Arc::new(InMemoryCustomerRepository::default());
        let svc = service_with(repo);
        svc.register(register_input(Some(true))).await.unwrap();

        let err = svc.register(register_input(None)).await.unwrap_err();
        assert!(matches!(err, CustomerError::DuplicatePhone));
    }

    #[tokio::test]
    async fn fail_when_save_without_phone_authenticated() {
        let repo = Arc::new(RecordingRepo::default());
        let svc = service_with(repo.clone());
        let err = svc.register(register_input(None)).await.unwrap_err();
        assert_eq!(err.to_string(), "phone number must be authenticated");
        assert_eq!(repo.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fail_when_save_with_false_phone_authenticated() {
        let repo = Arc::new(RecordingRepo::default());
        let svc = service_with(repo.clone());
        let err = svc.register(register_input(Some(false))).await.unwrap_err();
        assert!(matches!(err, CustomerError::UnverifiedPhone));
        assert_eq!(repo.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let repo = Arc::new(RecordingRepo::default());
        let svc = service_with(repo.clone());
        let mut input = register_input(Some(true));
        input.nickname = None;
        input.password = "123456789".into();

        let err = svc.register(input).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nickname cannot be null"), "{msg}");
        assert!(msg.contains("Password must contain"), "{msg}");
        assert_eq!(repo.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_conflict_after_clean_check_is_duplicate_phone() {
        let repo = Arc::new(RecordingRepo { blind_exists: true, ..Default::default() });
        let svc = service_with(repo.clone());
        svc.register(register_input(Some(true))).await.unwrap();

        let err = svc.register(register_input(Some(true))).await.unwrap_err();
        assert!(matches!(err, CustomerError::DuplicatePhone));
        assert_eq!(repo.saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn login_returns_issuer_output() {
        let repo = Arc::new(InMemoryCustomerRepository::default());
        let svc: CustomerService<InMemoryCustomerRepository> =
            CustomerService::new(repo, Arc::new(Argon2PasswordEncoder::default()), Arc::new(FixedIssuer));
        svc.register(register_input(Some(true))).await.unwrap();

        let pair = svc.login(LoginInput { phone: PHONE.into(), password: "bread123!".into() }).await.unwrap();
        assert_eq!(pair.access_token, "testAccessToken");
        assert_eq!(pair.refresh_token, "testRefreshToken");
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let svc = service_with(Arc::new(InMemoryCustomerRepository::default()));
        svc.register(register_input(Some(true))).await.unwrap();

        let pair = svc.login(LoginInput { phone: PHONE.into(), password: "bread123!".into() }).await.unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let me = svc.current(&pair.access_token).await.unwrap();
        assert_eq!(me.nickname, "baker");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let svc = service_with(Arc::new(InMemoryCustomerRepository::default()));
        svc.register(register_input(Some(true))).await.unwrap();

        let err = svc.login(LoginInput { phone: PHONE.into(), password: "bread124!".into() }).await.unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
    }

    #[tokio::test]
    async fn login_for_unknown_phone_is_unauthorized() {
        let svc = service_with(Arc::new(InMemoryCustomerRepository::default()));
        let err = svc.login(LoginInput { phone: "01099999999".into(), password: "bread123!".into() }).await.unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
    }

    /// Argon2 encoder that counts verify calls.
    #[derive(Default)]
    struct CountingEncoder {
        inner: Argon2PasswordEncoder,
        verifies: AtomicUsize,
    }

    impl PasswordEncoder for CountingEncoder {
        fn hash(&self, raw: &str) -> Result<String, CustomerError> {
            self.inner.hash(raw)
        }

        fn verify(&self, raw: &str, digest: &str) -> Result<bool, CustomerError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(raw, digest)
        }
    }

    #[tokio::test]
    async fn unknown_phone_and_wrong_password_both_run_one_verify() {
        let encoder = Arc::new(CountingEncoder::default());
        let svc = CustomerService::new(Arc::new(InMemoryCustomerRepository::default()), encoder.clone(), jwt());
        svc.register(register_input(Some(true))).await.unwrap();

        let err = svc.login(LoginInput { phone: "01099999999".into(), password: "bread123!".into() }).await.unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
        assert_eq!(encoder.verifies.load(Ordering::SeqCst), 1);

        // Even the decoy password itself is refused.
        let err = svc
            .login(LoginInput { phone: "01099999999".into(), password: "decoy-password-1!".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
        assert_eq!(encoder.verifies.load(Ordering::SeqCst), 2);

        let err = svc.login(LoginInput { phone: PHONE.into(), password: "bread124!".into() }).await.unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
        assert_eq!(encoder.verifies.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn over_long_or_blank_fields_are_validation_errors() {
        let repo = Arc::new(RecordingRepo::default());
        let svc = service_with(repo.clone());

        let mut input = register_input(Some(true));
        input.phone = "0".repeat(200);
        input.nickname = Some("n".repeat(500));
        let msg = match svc.register(input).await.unwrap_err() {
            CustomerError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert!(msg.contains("nickname must be at most 64 characters"), "{msg}");
        assert!(msg.contains("phone number must be at most 32 digits"), "{msg}");

        let mut input = register_input(Some(true));
        input.nickname = Some("   ".into());
        let err = svc.register(input).await.unwrap_err();
        assert_eq!(err.to_string(), "nickname: nickname cannot be null");
        assert_eq!(repo.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_issues_new_pair_and_rejects_access_tokens() {
        let svc = service_with(Arc::new(InMemoryCustomerRepository::default()));
        svc.register(register_input(Some(true))).await.unwrap();
        let pair = svc.login(LoginInput { phone: PHONE.into(), password: "bread123!".into() }).await.unwrap();

        let renewed = svc.refresh(RefreshInput { refresh_token: pair.refresh_token.clone() }).await.unwrap();
        assert_ne!(renewed.access_token, pair.access_token);

        let err = svc.refresh(RefreshInput { refresh_token: pair.access_token }).await.unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
    }

    #[tokio::test]
    async fn refresh_for_vanished_customer_is_unauthorized() {
        // Token minted by the same issuer for a phone that was never stored.
        let tokens = jwt();
        let ghost = Customer {
            id: uuid::Uuid::new_v4(),
            phone: "01000000000".into(),
            nickname: "ghost".into(),
            password_hash: String::new(),
            phone_verified: true,
        };
        let pair = tokens.issue(&ghost).unwrap();
        let svc = CustomerService::new(
            Arc::new(InMemoryCustomerRepository::default()),
            Arc::new(Argon2PasswordEncoder::default()),
            tokens,
        );
        let err = svc.refresh(RefreshInput { refresh_token: pair.refresh_token }).await.unwrap_err();
        assert!(matches!(err, CustomerError::Unauthorized));
    }

    #[tokio::test]
    async fn works_through_a_trait_object_repository() {
        let repo: Arc<dyn CustomerRepository> = Arc::new(InMemoryCustomerRepository::default());
        let svc: CustomerService<dyn CustomerRepository> =
            CustomerService::new(repo, Arc::new(Argon2PasswordEncoder::default()), jwt());
        let view = svc.register(register_input(Some(true))).await.unwrap();
        assert_eq!(view.phone, PHONE);
    }
}
