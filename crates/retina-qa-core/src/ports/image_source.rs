//! Image source port.

use crate::domain::LoadedImage;

/// Port for loading decoded images from a source.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over the images of this source, in a stable order.
    ///
    /// # Errors
    ///
    /// Individual items are errors when an image cannot be read or decoded;
    /// iteration continues past them.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<LoadedImage>> + Send + '_>;

    /// Returns the number of images, if known up front.
    fn count_hint(&self) -> Option<usize>;
}
