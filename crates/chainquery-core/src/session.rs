//! Guest session identity.
//!
//! A guest is scoped by a client-generated identifier persisted under
//! [`SESSION_KEY`]. The identifier is created lazily on first guest access and
//! then returned unchanged by every read until the session is cleared.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{SeedableRng, rngs::SmallRng};
use rand_core::{OsRng, RngCore};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Result,
  route::{Navigator, Route},
  storage::{SESSION_KEY, SharedStorage, USER_MODE_KEY},
  token::TokenStore,
};

// ─── User mode ───────────────────────────────────────────────────────────────

/// How the current user is identified to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UserMode {
  /// No account; history is scoped by the session identifier.
  Guest,
  /// A bearer token is persisted.
  Authenticated,
}

// ─── Identifier generation ───────────────────────────────────────────────────

/// Canonical layout of a version-4 identifier. `x` is any hex digit and `y`
/// is one of `8`, `9`, `a`, `b`.
const ID_TEMPLATE: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";

/// Generate a new session identifier.
///
/// Uses the operating system's cryptographic random source; if that is
/// unavailable, falls back to [`fallback_session_id`] over a time-seeded
/// pseudo-random generator.
pub fn generate_session_id() -> String {
  let mut bytes = [0u8; 16];
  match OsRng.try_fill_bytes(&mut bytes) {
    Ok(()) => uuid::Builder::from_random_bytes(bytes)
      .into_uuid()
      .hyphenated()
      .to_string(),
    Err(e) => {
      tracing::warn!("os random source unavailable ({e}); using fallback");
      fallback_session_id(&mut SmallRng::seed_from_u64(time_seed()))
    }
  }
}

/// Build an identifier character by character from [`ID_TEMPLATE`].
///
/// The result keeps the fixed hyphen positions, the version nibble `4` and
/// the variant bits `10xx`.
pub fn fallback_session_id<R: RngCore + ?Sized>(rng: &mut R) -> String {
  ID_TEMPLATE
    .chars()
    .map(|c| match c {
      'x' => hex_digit(rng.next_u32() % 16),
      'y' => hex_digit((rng.next_u32() % 16) & 0x3 | 0x8),
      other => other,
    })
    .collect()
}

fn hex_digit(value: u32) -> char { char::from_digit(value, 16).unwrap_or('0') }

fn time_seed() -> u64 {
  let nanos = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos() as u64)
    .unwrap_or_default();
  nanos ^ (u64::from(std::process::id()) << 32)
}

/// Whether `id` has the canonical 36-character layout of a version-4 UUID.
pub fn is_canonical_session_id(id: &str) -> bool {
  id.len() == ID_TEMPLATE.len()
    && id.chars().zip(ID_TEMPLATE.chars()).all(|(c, t)| match t {
      'x' => c.is_ascii_hexdigit() && !c.is_ascii_uppercase(),
      'y' => matches!(c, '8' | '9' | 'a' | 'b'),
      fixed => c == fixed,
    })
    && Uuid::parse_str(id).is_ok()
}

// ─── Session identity ────────────────────────────────────────────────────────

/// Accessor for the persisted session identifier and user mode flag.
///
/// Cheap to clone; all clones share the same storage.
#[derive(Clone)]
pub struct SessionIdentity {
  storage: SharedStorage,
}

impl SessionIdentity {
  pub fn new(storage: SharedStorage) -> Self { Self { storage } }

  /// The persisted identifier, or `None` if no guest session exists.
  /// Never creates one.
  pub fn get_session_id(&self) -> Result<Option<String>> {
    Ok(
      self
        .storage
        .get(SESSION_KEY)?
        .filter(|id| !id.is_empty()),
    )
  }

  /// Return the persisted identifier, creating and persisting one first if
  /// none exists. Does not touch the user mode flag.
  pub fn ensure_session_id(&self) -> Result<String> {
    if let Some(id) = self.get_session_id()? {
      return Ok(id);
    }
    let id = generate_session_id();
    self.storage.set(SESSION_KEY, &id)?;
    tracing::info!(session_id = %id, "created session identifier");
    Ok(id)
  }

  /// Enter guest mode: ensure an identifier exists, mark the user as a guest
  /// and move to the dashboard. Returns the session identifier.
  pub fn handle_guest_access<N>(&self, navigator: &mut N) -> Result<String>
  where
    N: Navigator + ?Sized,
  {
    let id = self.ensure_session_id()?;
    self.storage.set(USER_MODE_KEY, UserMode::Guest.as_ref())?;
    navigator.navigate(Route::Dashboard);
    Ok(id)
  }

  /// Whether the persisted user mode flag says `guest`.
  pub fn is_guest_user(&self) -> Result<bool> {
    let mode = self.storage.get(USER_MODE_KEY)?;
    Ok(matches!(
      mode.as_deref().map(str::parse::<UserMode>),
      Some(Ok(UserMode::Guest))
    ))
  }

  /// Resolve the effective mode: a persisted token wins over the guest flag.
  /// `None` means neither is present.
  pub fn user_mode(&self, tokens: &TokenStore) -> Result<Option<UserMode>> {
    if tokens.is_authenticated()? {
      return Ok(Some(UserMode::Authenticated));
    }
    Ok(self.is_guest_user()?.then_some(UserMode::Guest))
  }

  /// Delete both the session identifier and the user mode flag.
  pub fn clear_guest_session(&self) -> Result<()> {
    self.storage.delete(SESSION_KEY)?;
    self.storage.delete(USER_MODE_KEY)?;
    tracing::info!("cleared guest session");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{route::Navigation, storage::MemoryStorage};

  fn identity() -> SessionIdentity { SessionIdentity::new(MemoryStorage::shared()) }

  #[test]
  fn get_session_id_does_not_create() {
    let session = identity();
    assert_eq!(session.get_session_id().unwrap(), None);
    assert_eq!(session.get_session_id().unwrap(), None);
  }

  #[test]
  fn guest_access_creates_stable_id_and_navigates() {
    let session = identity();
    let mut nav: Vec<Navigation> = Vec::new();

    let id = session.handle_guest_access(&mut nav).unwrap();
    assert!(is_canonical_session_id(&id), "not canonical: {id}");
    assert_eq!(nav, vec![Navigation::Soft(Route::Dashboard)]);
    assert!(session.is_guest_user().unwrap());

    for _ in 0..3 {
      assert_eq!(session.get_session_id().unwrap().as_deref(), Some(id.as_str()));
    }

    // A second guest access reuses the identifier.
    let again = session.handle_guest_access(&mut nav).unwrap();
    assert_eq!(again, id);
  }

  #[test]
  fn clear_then_guest_access_yields_new_id() {
    let session = identity();
    let mut nav: Vec<Navigation> = Vec::new();

    let first = session.handle_guest_access(&mut nav).unwrap();
    session.clear_guest_session().unwrap();
    assert_eq!(session.get_session_id().unwrap(), None);
    assert!(!session.is_guest_user().unwrap());

    let second = session.handle_guest_access(&mut nav).unwrap();
    assert!(is_canonical_session_id(&second));
    assert_ne!(first, second);
  }

  #[test]
  fn ensure_session_id_leaves_mode_untouched() {
    let session = identity();
    let id = session.ensure_session_id().unwrap();
    assert_eq!(session.ensure_session_id().unwrap(), id);
    assert!(!session.is_guest_user().unwrap());
  }

  #[test]
  fn fallback_ids_are_canonical() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..200 {
      let id = fallback_session_id(&mut rng);
      assert!(is_canonical_session_id(&id), "not canonical: {id}");
      assert_eq!(&id[14..15], "4");
    }
  }

  #[test]
  fn canonical_check_rejects_malformed_ids() {
    assert!(!is_canonical_session_id("sess-1"));
    assert!(!is_canonical_session_id("6f1c8e7a-3a0e-1f7e-9c1b-2a5d4e6f7a8b"));
    assert!(!is_canonical_session_id("6f1c8e7a-3a0e-4f7e-7c1b-2a5d4e6f7a8b"));
    assert!(is_canonical_session_id("6f1c8e7a-3a0e-4f7e-9c1b-2a5d4e6f7a8b"));
  }

  #[test]
  fn user_mode_prefers_token() {
    let storage = MemoryStorage::shared();
    let session = SessionIdentity::new(storage.clone());
    let tokens = TokenStore::new(storage);

    assert_eq!(session.user_mode(&tokens).unwrap(), None);

    session
      .handle_guest_access(&mut Vec::<Navigation>::new())
      .unwrap();
    assert_eq!(session.user_mode(&tokens).unwrap(), Some(UserMode::Guest));

    tokens.set("tok").unwrap();
    assert_eq!(
      session.user_mode(&tokens).unwrap(),
      Some(UserMode::Authenticated)
    );
  }

  #[test]
  fn unknown_mode_flag_is_not_guest() {
    let storage = MemoryStorage::shared();
    storage.set(USER_MODE_KEY, "visitor").unwrap();
    assert!(!SessionIdentity::new(storage).is_guest_user().unwrap());
  }
}
