//! Error types for fetching, parsing and clock synchronisation

/// Transport-level failure while fetching a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Network link is not up
    LinkDown,
    /// Host name could not be resolved
    Dns,
    /// TCP connection failed
    Connect,
    /// Request could not be sent or the response not read
    Request,
    /// Server answered with a non-success status code
    Status(u16),
    /// Response body does not fit the receive buffer
    BufferTooSmall,
    /// Response body is not UTF-8
    InvalidUtf8,
}

/// Malformed timestamp, offset or event record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// A required field is absent
    MissingField,
    /// A field that must be an integer is not
    InvalidInteger,
    /// Timestamp does not match `YYYY-MM-DDTHH:MM:SS`
    InvalidTimestamp,
    /// UTC offset does not match `±HH:MM`
    InvalidOffset,
    /// Payload is not the expected JSON object
    InvalidJson,
    /// A text field exceeds its fixed capacity
    TooLong,
}

/// The system clock refused the new time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    Rejected,
}

/// Why a single time sync attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttemptError {
    Fetch(FetchError),
    Parse(ParseError),
    Clock(ClockError),
}

impl From<FetchError> for AttemptError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<ParseError> for AttemptError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<ClockError> for AttemptError {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

/// Time synchronisation gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Every attempt failed; `last` is the final failure
    Exhausted { attempts: u8, last: AttemptError },
}

/// Event refresh failed; the previous event is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventError {
    Fetch(FetchError),
    Parse(ParseError),
}

impl From<FetchError> for EventError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<ParseError> for EventError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

/// The frame could not be pushed to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    Backend,
}
