use thiserror::Error;

/// Errors produced by event creation and roster transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// The event name is empty or whitespace-only.
    #[error("Event name must not be empty")]
    InvalidName,

    /// An event with the same name (case-insensitive) already exists.
    #[error("An event with this name already exists")]
    DuplicateEventName,

    /// The acting account name is empty; the caller is not logged in.
    #[error("You must be logged in to do that")]
    NotAuthenticated,

    /// The account already holds a primary or backup slot.
    #[error("Already signed up for this event")]
    AlreadyJoined,

    /// Both the primary roster and the backup waitlist are full.
    #[error("The event is full")]
    EventFull,

    /// The account holds neither a primary nor a backup slot.
    #[error("Not signed up for this event")]
    NotAParticipant,

    /// Only the event creator may cancel it.
    #[error("Only the event creator can cancel it")]
    NotCreator,
}

/// Errors produced by account registration and authentication.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// The account name or password is empty.
    #[error("Name and password must not be empty")]
    InvalidName,

    /// An account with the same name (case-sensitive) already exists.
    #[error("Account name already taken")]
    DuplicateAccount,

    /// No account with the given name.
    #[error("Unknown account")]
    UnknownAccount,

    /// The password digest did not match the stored one.
    #[error("Wrong password")]
    WrongPassword,
}
