//! Ports for the identity session.

pub mod outbound;

pub use outbound::{
    challenge_message, AuthBackend, ChallengeSigner, InMemoryAuthBackend, LoginChallenge,
    NewAccount, ProfileUpdate, SessionDto,
};
