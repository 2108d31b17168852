use chrono::Utc;
use std::{fmt::Display, str::FromStr};

/// Number of hex characters in an id: 4 bytes of timestamp and 8 random bytes.
pub const ID_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}'")]
pub struct IdParseError {
    pub kind: &'static str,
    pub value: String,
}

pub fn is_hex_id(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn new_hex_id() -> String {
    hex_id_at(Utc::now().timestamp(), rand::random())
}

/// Timestamps outside the 32 bit range are clamped to it.
fn hex_id_at(unix_secs: i64, tail: [u8; 8]) -> String {
    let secs = u32::try_from(unix_secs.max(0)).unwrap_or(u32::MAX);
    secs.to_be_bytes()
        .iter()
        .chain(tail.iter())
        .map(|b| format!("{:02x}", b))
        .collect()
}

macro_rules! impl_id {
    ($ident:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $ident(String);

        impl $ident {
            pub fn generate() -> Self {
                $ident(new_hex_id())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $ident {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_hex_id(s) {
                    Ok($ident(s.to_ascii_lowercase()))
                } else {
                    Err(IdParseError {
                        kind: stringify!($ident),
                        value: s.to_owned(),
                    })
                }
            }
        }

        impl Display for $ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

impl_id!(AlbumId);
impl_id!(TrackId);

#[cfg(test)]
mod test {
    use claims::{assert_err, assert_ok};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn generated_ids_parse_back() {
        let id = AlbumId::generate();
        assert_eq!(id.as_str().len(), ID_LEN);
        let parsed: AlbumId = assert_ok!(id.as_str().parse());
        assert_eq!(parsed, id);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(TrackId::generate(), TrackId::generate());
    }

    #[test]
    fn parsing_normalizes_case() {
        let id: TrackId = assert_ok!("65E1A2B3C4D5E6F708192A3B".parse());
        assert_eq!(id.as_str(), "65e1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn timestamp_prefix_is_clamped() {
        let tail = [0xab; 8];
        assert_eq!(hex_id_at(0x65e1_a2b3, tail), "65e1a2b3abababababababab");
        assert_eq!(hex_id_at(-30, tail), "00000000abababababababab");
        assert_eq!(hex_id_at(1 << 40, tail), "ffffffffabababababababab");
        assert!(is_hex_id(&hex_id_at(i64::MAX, tail)));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert_err!("".parse::<AlbumId>());
        assert_err!("65e1a2b3c4d5e6f708192a3".parse::<AlbumId>());
        assert_err!("65e1a2b3c4d5e6f708192a3bb".parse::<AlbumId>());
        let err = assert_err!("zze1a2b3c4d5e6f708192a3b".parse::<AlbumId>());
        assert_eq!(err.kind, "AlbumId");
    }
}
