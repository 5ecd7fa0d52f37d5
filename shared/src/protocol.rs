//! Score channel wire protocol
//!
//! Every message travels as one frame: a big-endian `u16` payload length
//! followed by that many bytes of UTF-8 text.
//!
//! - Client to relay: [`ScoreReport`], either `"<score>"` or `"<name>:<score>"`.
//! - Relay to client: [`ScoreUpdate`], always `"<name>:<score>"`.
//!
//! Scores are always sent as decimal text. Names may not be empty and may not
//! contain the `:` delimiter; such frames are rejected instead of guessed at.

use crate::{FIELD_DELIMITER, MAX_FRAME_LEN};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Transport-level failures while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("connection closed")]
    Closed,
    #[error("frame payload of {0} bytes exceeds the {max} byte limit", max = MAX_FRAME_LEN)]
    TooLong(usize),
    #[error("frame payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed message contents inside an otherwise well-formed frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("missing ':' delimiter in {0:?}")]
    MissingDelimiter(String),
    #[error("player name {0:?} contains the ':' delimiter")]
    NameContainsDelimiter(String),
    #[error("player name is empty")]
    EmptyName,
    #[error("invalid score {0:?}")]
    InvalidScore(String),
}

/// Builds the on-wire bytes for one frame.
pub fn encode_frame(payload: &str) -> Result<Vec<u8>, FrameError> {
    let len = payload.len();
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLong(len));
    }

    let mut data = Vec::with_capacity(2 + len);
    data.extend_from_slice(&(len as u16).to_be_bytes());
    data.extend_from_slice(payload.as_bytes());
    Ok(data)
}

pub async fn write_frame<W>(writer: &mut W, payload: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let data = encode_frame(payload)?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

/// Waits for the next complete frame.
///
/// End of stream before a length header is reported as [`FrameError::Closed`];
/// a stream that ends inside a payload is an I/O error.
pub async fn read_frame<R>(reader: &mut R) -> Result<String, FrameError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u16().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(FrameError::Closed),
        Err(e) => return Err(e.into()),
    };

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(String::from_utf8(payload)?)
}

pub fn validate_name(name: &str) -> Result<(), MessageError> {
    if name.is_empty() {
        return Err(MessageError::EmptyName);
    }
    if name.contains(FIELD_DELIMITER) {
        return Err(MessageError::NameContainsDelimiter(name.to_string()));
    }
    Ok(())
}

fn parse_score(text: &str) -> Result<u32, MessageError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MessageError::InvalidScore(text.to_string()));
    }
    text.parse()
        .map_err(|_| MessageError::InvalidScore(text.to_string()))
}

/// A player's score as broadcast by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    name: String,
    score: u32,
}

impl ScoreUpdate {
    pub fn new(name: impl Into<String>, score: u32) -> Result<Self, MessageError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, score })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn into_parts(self) -> (String, u32) {
        (self.name, self.score)
    }
}

impl fmt::Display for ScoreUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, FIELD_DELIMITER, self.score)
    }
}

impl FromStr for ScoreUpdate {
    type Err = MessageError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        // Split on the last delimiter so a name carrying one is reported as such.
        let (name, score) = payload
            .rsplit_once(FIELD_DELIMITER)
            .ok_or_else(|| MessageError::MissingDelimiter(payload.to_string()))?;
        let score = parse_score(score)?;
        Self::new(name, score)
    }
}

/// A score sent by a client, optionally announcing the sender's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    name: Option<String>,
    score: u32,
}

impl ScoreReport {
    pub fn anonymous(score: u32) -> Self {
        Self { name: None, score }
    }

    pub fn named(name: impl Into<String>, score: u32) -> Result<Self, MessageError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name: Some(name),
            score,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}{}{}", name, FIELD_DELIMITER, self.score),
            None => write!(f, "{}", self.score),
        }
    }
}

impl FromStr for ScoreReport {
    type Err = MessageError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        match payload.rsplit_once(FIELD_DELIMITER) {
            Some((name, score)) => {
                let score = parse_score(score)?;
                Self::named(name, score)
            }
            None => Ok(Self::anonymous(parse_score(payload)?)),
        }
    }
}
