pub mod image;
pub mod preview;
pub mod result;
pub mod session;

pub use image::{media_type_for_extension, ImageFile};
pub use preview::PreviewHandle;
pub use result::{TextBlock, TextPair, TranslationResult};
pub use session::{SessionPhase, SubmitTicket, TranslationSession};
