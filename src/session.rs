use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::database::filter::Condition;
use crate::database::{idgen, to_fields, Collection, Fields, Repository};
use crate::error::{AuthError, ServiceError};
use crate::ledger;
use crate::records::{AuthProvider, LedgerEntry, LedgerKind, User};

pub const MAX_FAILED_ATTEMPTS: u32 = 5;
pub const LOCKOUT_MINUTES: i64 = 15;
pub const MIN_PASSWORD_STRENGTH: u32 = 30;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\+]?[(]?[0-9]{3}[)]?[-\s\.]?[0-9]{3}[-\s\.]?[0-9]{4,6}$").expect("phone pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Scores 0..=100, registration needs at least [`MIN_PASSWORD_STRENGTH`].
pub fn password_strength(password: &str) -> u32 {
    let len = password.chars().count();
    let mut score = 0;
    if len >= 8 {
        score += 25;
    }
    if len >= 12 {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 20;
    }
    score
}

// stored as `<salt>$<hex sha256(salt + password)>`
pub fn hash_password(password: &str, salt: &str) -> String {
    let digest = Sha256::digest(format!("{salt}{password}").as_bytes());
    format!("{salt}${}", hex::encode(digest))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => hash_password(password, salt) == stored,
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    fn validate(&self) -> Result<(), AuthError> {
        if [&self.name, &self.email, &self.password, &self.confirm_password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AuthError::MissingFields);
        }
        if self.name.trim().chars().count() < 2 {
            return Err(AuthError::NameTooShort);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(AuthError::InvalidEmail);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.chars().count() < 6 {
            return Err(AuthError::PasswordTooShort);
        }
        if password_strength(&self.password) < MIN_PASSWORD_STRENGTH {
            return Err(AuthError::WeakPassword);
        }
        Ok(())
    }
}

/// Identity asserted by an external sign-in provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderProfile {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// Empty fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub student_id: String,
}

#[derive(Debug, Default)]
struct Attempts {
    failures: u32,
    locked_until: Option<DateTime<Utc>>,
}

pub struct AuthService {
    repo: Arc<dyn Repository>,
    initial_credit: BigDecimal,
    admin_emails: Vec<String>,
    attempts: Mutex<HashMap<String, Attempts>>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn Repository>, initial_credit: BigDecimal) -> Self {
        Self {
            repo,
            initial_credit,
            admin_emails: Vec::new(),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Addresses that only [`AuthService::provision_admins`] may create.
    pub fn with_admin_emails(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = emails.iter().map(|email| normalize_email(email)).collect();
        self
    }

    fn is_reserved(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.admin_emails.iter().any(|admin| *admin == email)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let email = normalize_email(email);
        let found = self
            .repo
            .query(Collection::Users, &[Condition::eq("email", email.as_str())])?;
        Ok(found.first().map(|doc| doc.decode()).transpose()?)
    }

    pub fn register(&self, form: &Registration) -> Result<User, ServiceError> {
        form.validate()?;
        let email = normalize_email(&form.email);
        if self.is_reserved(&email) {
            warn!(email = %email, "registration with a reserved admin address refused");
            return Err(AuthError::EmailReserved.into());
        }
        if self.find_by_email(&email)?.is_some() {
            return Err(AuthError::EmailInUse.into());
        }
        let user = User {
            id: String::new(),
            name: form.name.trim().to_string(),
            email,
            credit: self.initial_credit.clone(),
            provider: AuthProvider::Email,
            password_hash: Some(hash_password(&form.password, &idgen::random_hex())),
            phone: None,
            student_id: None,
            picture: None,
            provider_subject: None,
            admin: false,
            created_at: None,
        };
        let user = self.create_user(&user)?;
        info!(user_id = %user.id, "registered new user");
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        self.login_at(email, password, Utc::now())
    }

    pub(crate) fn login_at(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<User, ServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields.into());
        }
        if !is_valid_email(email.trim()) {
            return Err(AuthError::InvalidEmail.into());
        }
        let email = normalize_email(email);
        self.check_lock(&email, now)?;

        let user = match self.find_by_email(&email)? {
            Some(user) => user,
            None => return Err(self.record_failure(&email, now).into()),
        };
        match &user.password_hash {
            Some(stored) if verify_password(password, stored) => {
                self.clear_failures(&email);
                Ok(user)
            }
            Some(_) => Err(self.record_failure(&email, now).into()),
            None => Err(AuthError::ProviderMismatch.into()),
        }
    }

    /// Creates the account on first sign-in. Later sign-ins find it by the
    /// provider subject, or by email for accounts the subject is not yet on.
    pub fn sign_in_with_provider(&self, profile: &ProviderProfile) -> Result<User, ServiceError> {
        let subject = profile.subject.trim();
        if subject.is_empty() {
            return Err(ServiceError::bad_parameter("subject"));
        }
        if !is_valid_email(profile.email.trim()) {
            return Err(AuthError::InvalidEmail.into());
        }
        let linked = self
            .repo
            .query(Collection::Users, &[Condition::eq("providerSubject", subject)])?;
        if let Some(doc) = linked.first() {
            return Ok(doc.decode()?);
        }
        if self.is_reserved(&profile.email) {
            warn!(email = %profile.email, "provider sign-in with a reserved admin address refused");
            return Err(AuthError::EmailReserved.into());
        }
        if let Some(user) = self.find_by_email(&profile.email)? {
            return Ok(user);
        }
        let name = match profile.name.trim() {
            "" => profile.email.trim().to_string(),
            name => name.to_string(),
        };
        let user = User {
            id: String::new(),
            name,
            email: normalize_email(&profile.email),
            credit: self.initial_credit.clone(),
            provider: AuthProvider::Google,
            password_hash: None,
            phone: None,
            student_id: None,
            picture: profile.picture.clone(),
            provider_subject: Some(subject.to_string()),
            admin: false,
            created_at: None,
        };
        let user = self.create_user(&user)?;
        info!(user_id = %user.id, "registered new user via provider");
        Ok(user)
    }

    /// Creates the missing admin accounts and resets the password of the
    /// existing ones. An account someone registered under an admin address
    /// before it was listed is left unprivileged. Returns the number of admin
    /// accounts ready to sign in.
    pub fn provision_admins(&self, password: Option<&str>) -> Result<usize, ServiceError> {
        if self.admin_emails.is_empty() {
            return Ok(0);
        }
        let password = match password {
            Some(password) => password,
            None => {
                warn!("ADMIN_EMAILS is set without ADMIN_PASSWORD, no admin accounts provisioned");
                return Ok(0);
            }
        };
        if password.chars().count() < 8 || password_strength(password) < MIN_PASSWORD_STRENGTH {
            return Err(AuthError::WeakPassword.into());
        }

        let mut ready = 0;
        for email in &self.admin_emails {
            let password_hash = hash_password(password, &idgen::random_hex());
            match self.find_by_email(email)? {
                Some(user) if user.admin => {
                    let mut patch = Fields::new();
                    patch.insert("passwordHash".to_string(), Value::String(password_hash));
                    self.repo.update(Collection::Users, &user.id, patch)?;
                }
                Some(user) => {
                    warn!(user_id = %user.id, email = %email, "admin address belongs to a self-registered account, not granting admin");
                    continue;
                }
                None => {
                    let user = self.create_user(&User {
                        id: String::new(),
                        name: "Administrator".to_string(),
                        email: email.clone(),
                        credit: BigDecimal::zero(),
                        provider: AuthProvider::Email,
                        password_hash: Some(password_hash),
                        phone: None,
                        student_id: None,
                        picture: None,
                        provider_subject: None,
                        admin: true,
                        created_at: None,
                    })?;
                    info!(user_id = %user.id, email = %email, "provisioned admin account");
                }
            }
            ready += 1;
        }
        Ok(ready)
    }

    // the opening credit entry keeps credits minus debits equal to the balance
    fn create_user(&self, user: &User) -> Result<User, ServiceError> {
        let user: User = self.repo.create(Collection::Users, to_fields(user)?)?.decode()?;
        if user.credit.is_positive() {
            ledger::record(
                self.repo.as_ref(),
                &LedgerEntry {
                    id: String::new(),
                    user_id: user.id.clone(),
                    date: Utc::now(),
                    description: "Opening balance".to_string(),
                    amount: user.credit.clone(),
                    kind: LedgerKind::Credit,
                },
            )?;
        }
        Ok(user)
    }

    fn check_lock(&self, email: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = attempts.get_mut(email) {
            match entry.locked_until {
                Some(until) if until > now => return Err(AuthError::TooManyRequests),
                Some(_) => *entry = Attempts::default(),
                None => {}
            }
        }
        Ok(())
    }

    fn record_failure(&self, email: &str, now: DateTime<Utc>) -> AuthError {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = attempts.entry(email.to_string()).or_default();
        entry.failures += 1;
        if entry.failures >= MAX_FAILED_ATTEMPTS {
            warn!(email, "too many failed sign-in attempts, locking account");
            entry.failures = 0;
            entry.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
        }
        AuthError::InvalidCredentials
    }

    fn clear_failures(&self, email: &str) {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(email);
    }
}

/// The signed-in user. Every read goes to the repository so balances are
/// never served from a stale copy.
pub struct Session {
    repo: Arc<dyn Repository>,
    user_id: String,
}

impl Session {
    pub fn new(repo: Arc<dyn Repository>, user_id: &str) -> Self {
        Self {
            repo,
            user_id: user_id.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repo.as_ref()
    }

    pub fn current_user(&self) -> Result<User, ServiceError> {
        match self.repo.get(Collection::Users, &self.user_id)? {
            Some(doc) => Ok(doc.decode()?),
            None => Err(ServiceError::Unauthorized),
        }
    }

    pub fn credit(&self) -> Result<BigDecimal, ServiceError> {
        Ok(self.current_user()?.credit)
    }

    pub fn update_credit(&self, balance: &BigDecimal) -> Result<(), ServiceError> {
        let mut patch = Fields::new();
        patch.insert("credit".to_string(), serde_json::to_value(balance)?);
        self.patch(patch)
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ServiceError> {
        let mut patch = Fields::new();
        let name = update.name.trim();
        if !name.is_empty() {
            if name.chars().count() < 2 {
                return Err(AuthError::NameTooShort.into());
            }
            patch.insert("name".to_string(), Value::String(name.to_string()));
        }
        let phone = update.phone.trim();
        if !phone.is_empty() {
            if !is_valid_phone(phone) {
                return Err(ServiceError::bad_parameter("phone"));
            }
            patch.insert("phone".to_string(), Value::String(phone.to_string()));
        }
        let student_id = update.student_id.trim();
        if !student_id.is_empty() {
            patch.insert("studentId".to_string(), Value::String(student_id.to_string()));
        }
        if !patch.is_empty() {
            self.patch(patch)?;
        }
        self.current_user()
    }

    fn patch(&self, patch: Fields) -> Result<(), ServiceError> {
        if self.repo.update(Collection::Users, &self.user_id, patch)? {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }
}

/// Bearer tokens handed out at sign-in, kept in memory only.
#[derive(Default)]
pub struct SessionRegistry {
    tokens: Mutex<HashMap<String, String>>,
}

impl SessionRegistry {
    pub fn issue(&self, user_id: &str) -> String {
        let token = idgen::random_hex();
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), user_id.to_string());
        token
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::local::LocalStore;
    use crate::money::cents;

    fn service() -> AuthService {
        AuthService::new(Arc::new(LocalStore::in_memory()), BigDecimal::from(25))
    }

    fn admin_service(repo: Arc<dyn Repository>) -> AuthService {
        AuthService::new(repo, BigDecimal::from(25)).with_admin_emails(vec![" Dean@Uni.edu ".to_string()])
    }

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn auth_error(result: Result<User, ServiceError>) -> AuthError {
        match result {
            Err(ServiceError::Auth(e)) => e,
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_and_phone_shapes() {
        assert!(is_valid_email("lina@uni.edu.jo"));
        assert!(!is_valid_email("lina@uni"));
        assert!(!is_valid_email("li na@uni.edu"));
        assert!(!is_valid_email("@uni.edu"));
        assert!(is_valid_phone("+962791234567"));
        assert!(is_valid_phone("(079) 123-4567"));
        assert!(is_valid_phone("079.123.4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("079-123-45a7"));
    }

    #[test]
    fn test_password_strength() {
        assert_eq!(password_strength("abcdef"), 15);
        assert_eq!(password_strength("abcdefgh"), 40);
        assert_eq!(password_strength("Abcdef1!"), 90);
        assert_eq!(password_strength("Abcdefgh1!xy"), 100);
    }

    #[test]
    fn test_password_hash_is_salted() {
        let first = hash_password("Secret1!", "aa");
        let second = hash_password("Secret1!", "bb");
        assert_ne!(first, second);
        assert!(verify_password("Secret1!", &first));
        assert!(!verify_password("secret1!", &first));
        assert!(!verify_password("Secret1!", "no-salt"));
    }

    #[test]
    fn test_registration_rules() {
        let auth = service();
        assert_eq!(auth_error(auth.register(&form("", "a@b.co", "x", "x"))), AuthError::MissingFields);
        assert_eq!(
            auth_error(auth.register(&form("L", "a@b.co", "Secret1!", "Secret1!"))),
            AuthError::NameTooShort
        );
        assert_eq!(
            auth_error(auth.register(&form("Lina", "a@b", "Secret1!", "Secret1!"))),
            AuthError::InvalidEmail
        );
        assert_eq!(
            auth_error(auth.register(&form("Lina", "a@b.co", "Secret1!", "Secret2!"))),
            AuthError::PasswordMismatch
        );
        assert_eq!(
            auth_error(auth.register(&form("Lina", "a@b.co", "Ab1!", "Ab1!"))),
            AuthError::PasswordTooShort
        );
        assert_eq!(
            auth_error(auth.register(&form("Lina", "a@b.co", "abcdef", "abcdef"))),
            AuthError::WeakPassword
        );
    }

    #[test]
    fn test_register_and_login() {
        let auth = service();
        let user = auth
            .register(&form("Lina", "Lina@Uni.edu", "Secret1!", "Secret1!"))
            .unwrap();
        assert_eq!(user.email, "lina@uni.edu");
        assert_eq!(user.credit, BigDecimal::from(25));
        assert_eq!(user.provider, AuthProvider::Email);
        assert!(user.created_at.is_some());

        assert_eq!(
            auth_error(auth.register(&form("Other", "LINA@uni.edu", "Secret1!", "Secret1!"))),
            AuthError::EmailInUse
        );

        let logged_in = auth.login("LINA@UNI.EDU", "Secret1!").unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(
            auth_error(auth.login("lina@uni.edu", "wrong")),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth_error(auth.login("nobody@uni.edu", "Secret1!")),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_registration_writes_opening_balance() {
        let auth = service();
        let user = auth
            .register(&form("Lina", "lina@uni.edu", "Secret1!", "Secret1!"))
            .unwrap();
        let entries = ledger::entries_for(auth.repo.as_ref(), &user.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LedgerKind::Credit);
        assert_eq!(entries[0].amount, BigDecimal::from(25));
    }

    #[test]
    fn test_lockout_after_repeated_failures() {
        let auth = service();
        auth.register(&form("Lina", "lina@uni.edu", "Secret1!", "Secret1!"))
            .unwrap();
        let start = Utc::now();
        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert_eq!(
                auth_error(auth.login_at("lina@uni.edu", "nope", start)),
                AuthError::InvalidCredentials
            );
        }
        assert_eq!(
            auth_error(auth.login_at("lina@uni.edu", "Secret1!", start + Duration::minutes(1))),
            AuthError::TooManyRequests
        );
        let later = start + Duration::minutes(LOCKOUT_MINUTES + 1);
        assert!(auth.login_at("lina@uni.edu", "Secret1!", later).is_ok());
    }

    #[test]
    fn test_provider_sign_in() {
        let auth = service();
        let profile = ProviderProfile {
            subject: "google-123".to_string(),
            name: "Omar".to_string(),
            email: "omar@gmail.com".to_string(),
            picture: Some("https://example.invalid/omar.png".to_string()),
        };
        let user = auth.sign_in_with_provider(&profile).unwrap();
        assert_ne!(user.id, "google-123");
        assert_eq!(user.provider_subject.as_deref(), Some("google-123"));
        assert_eq!(user.provider, AuthProvider::Google);
        assert!(user.password_hash.is_none());
        assert!(!user.admin);

        let again = auth.sign_in_with_provider(&profile).unwrap();
        assert_eq!(again.id, user.id);
        let renamed = auth
            .sign_in_with_provider(&ProviderProfile {
                email: "omar.k@gmail.com".to_string(),
                ..profile.clone()
            })
            .unwrap();
        assert_eq!(renamed.id, user.id);
        assert_eq!(
            auth_error(auth.login("omar@gmail.com", "whatever")),
            AuthError::ProviderMismatch
        );
        assert!(matches!(
            auth.sign_in_with_provider(&ProviderProfile {
                subject: " ".to_string(),
                ..profile
            }),
            Err(ServiceError::BadParameter(_))
        ));
    }

    #[test]
    fn test_provider_subject_cannot_replace_a_user() {
        let auth = service();
        let lina = auth
            .register(&form("Lina", "lina@uni.edu", "Secret1!", "Secret1!"))
            .unwrap();
        let other = auth
            .sign_in_with_provider(&ProviderProfile {
                subject: lina.id.clone(),
                name: "Mallory".to_string(),
                email: "mallory@gmail.com".to_string(),
                picture: None,
            })
            .unwrap();
        assert_ne!(other.id, lina.id);

        let stored: User = auth.repo.get(Collection::Users, &lina.id).unwrap().unwrap().decode().unwrap();
        assert_eq!(stored.name, "Lina");
        assert_eq!(stored.email, "lina@uni.edu");
        assert!(auth.login("lina@uni.edu", "Secret1!").is_ok());
    }

    #[test]
    fn test_admin_addresses_are_reserved() {
        let auth = admin_service(Arc::new(LocalStore::in_memory()));
        assert_eq!(
            auth_error(auth.register(&form("Dean", "DEAN@uni.edu", "Secret1!", "Secret1!"))),
            AuthError::EmailReserved
        );
        assert_eq!(
            auth_error(auth.sign_in_with_provider(&ProviderProfile {
                subject: "google-dean".to_string(),
                name: "Dean".to_string(),
                email: "dean@uni.edu".to_string(),
                picture: None,
            })),
            AuthError::EmailReserved
        );
        assert!(auth.find_by_email("dean@uni.edu").unwrap().is_none());
    }

    #[test]
    fn test_provision_admins() {
        let auth = admin_service(Arc::new(LocalStore::in_memory()));
        assert_eq!(auth.provision_admins(None).unwrap(), 0);
        assert!(auth.find_by_email("dean@uni.edu").unwrap().is_none());
        assert!(matches!(
            auth.provision_admins(Some("dean")),
            Err(ServiceError::Auth(AuthError::WeakPassword))
        ));

        assert_eq!(auth.provision_admins(Some("Deanpass1!")).unwrap(), 1);
        let dean = auth.login("dean@uni.edu", "Deanpass1!").unwrap();
        assert!(dean.admin);
        assert!(dean.credit.is_zero());

        assert_eq!(auth.provision_admins(Some("Newpass2!x")).unwrap(), 1);
        assert_eq!(auth.login("dean@uni.edu", "Newpass2!x").unwrap().id, dean.id);
        assert_eq!(
            auth_error(auth.login("dean@uni.edu", "Deanpass1!")),
            AuthError::InvalidCredentials
        );
        assert_eq!(auth.repo.query(Collection::Users, &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_provision_skips_self_registered_account() {
        let repo: Arc<dyn Repository> = Arc::new(LocalStore::in_memory());
        let early = AuthService::new(repo.clone(), BigDecimal::from(25))
            .register(&form("Dean", "dean@uni.edu", "Secret1!", "Secret1!"))
            .unwrap();

        let auth = admin_service(repo);
        assert_eq!(auth.provision_admins(Some("Deanpass1!")).unwrap(), 0);
        let user = auth.login("dean@uni.edu", "Secret1!").unwrap();
        assert_eq!(user.id, early.id);
        assert!(!user.admin);
    }

    #[test]
    fn test_session_profile_and_credit() {
        let auth = service();
        let user = auth
            .register(&form("Lina", "lina@uni.edu", "Secret1!", "Secret1!"))
            .unwrap();
        let session = Session::new(auth.repo.clone(), &user.id);
        session.update_credit(&cents(1250)).unwrap();
        assert_eq!(session.credit().unwrap(), cents(1250));

        let updated = session
            .update_profile(&ProfileUpdate {
                name: String::new(),
                phone: "0791234567".to_string(),
                student_id: "2021901".to_string(),
            })
            .unwrap();
        assert_eq!(updated.name, "Lina");
        assert_eq!(updated.phone.as_deref(), Some("0791234567"));
        assert_eq!(updated.student_id.as_deref(), Some("2021901"));

        assert!(matches!(
            session.update_profile(&ProfileUpdate {
                phone: "call me".to_string(),
                ..ProfileUpdate::default()
            }),
            Err(ServiceError::BadParameter(_))
        ));

        let ghost = Session::new(auth.repo.clone(), "ghost");
        assert!(matches!(ghost.current_user(), Err(ServiceError::Unauthorized)));
        assert!(matches!(ghost.update_credit(&cents(1)), Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn test_registry() {
        let registry = SessionRegistry::default();
        let token = registry.issue("u1");
        assert_eq!(registry.resolve(&token).as_deref(), Some("u1"));
        assert!(registry.revoke(&token));
        assert!(!registry.revoke(&token));
        assert!(registry.resolve(&token).is_none());
    }
}
