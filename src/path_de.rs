use serde::de::DeserializeOwned;

use crate::error::DocError;

/// Deserialize with the JSON path of the failing node attached to the error.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DocError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DocError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

fn located(err: serde_path_to_error::Error<serde_json::Error>) -> DocError {
    let path = err.path().to_string();
    DocError::Parse { path, message: err.into_inner().to_string() }
}
