use thiserror::Error;

const PNG_SUFFIX: &str = ".png";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key '{key}' must be relative")]
    Absolute { key: String },
    #[error("asset key '{key}' has an empty or '.'/'..' segment")]
    BadSegment { key: String },
    #[error("asset key '{key}' must not carry the .png extension")]
    HasExtension { key: String },
    #[error("asset key '{key}' contains invalid character '{character}'")]
    InvalidCharacter { key: String, character: char },
}

/// Keys name a png under the asset directories, without its suffix:
/// `blue_car`, `track-maps`, `cars/red_car`. Segments are `/`-separated and
/// limited to lowercase ascii, digits, `_` and `-`.
pub fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(AssetKeyError::Absolute {
            key: key.to_string(),
        });
    }
    if key.ends_with(PNG_SUFFIX) {
        return Err(AssetKeyError::HasExtension {
            key: key.to_string(),
        });
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(AssetKeyError::BadSegment {
                key: key.to_string(),
            });
        }
        if let Some(character) = segment.chars().find(|ch| !is_key_char(*ch)) {
            return Err(AssetKeyError::InvalidCharacter {
                key: key.to_string(),
                character,
            });
        }
    }
    Ok(())
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'
}
