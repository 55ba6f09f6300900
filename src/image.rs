use std::path::{Path, PathBuf};

use base64::Engine;
use futures::future::{BoxFuture, FutureExt};

use crate::errors::ReviewError;
use crate::review::ImageRef;

/// Turns a picked image file into a reference that can be stored and
/// shown. Dropping the returned future abandons the encoding; nothing
/// is recorded until it resolves and the caller submits.
pub trait ImageEncoder: Send + Sync {
    fn encode<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<ImageRef, ReviewError>>;
}

/// Embeds the whole file in a base64 `data:` URI.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataUrlEncoder;

impl ImageEncoder for DataUrlEncoder {
    fn encode<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<ImageRef, ReviewError>> {
        encode_data_url(path.to_owned()).boxed()
    }
}

async fn encode_data_url(path: PathBuf) -> Result<ImageRef, ReviewError> {
    let mime_type = mime_guess::from_path(&path).first_or_octet_stream();

    if mime_type.type_() != mime::IMAGE {
        return Err(ReviewError::NotAnImage {
            path,
            mime_type: mime_type.essence_str().to_owned(),
        });
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(source) => return Err(ReviewError::ImageRead { path, source }),
    };

    Ok(ImageRef::new(data_url(mime_type.essence_str(), &bytes)))
}

/// Formats bytes as a base64 `data:` URI.
pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
