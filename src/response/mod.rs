//! Response normalization and rendering pipeline.
//!
//! ```text
//! BackendValue ──normalize()──► NormalizedDocument (markup string)
//!                                   │
//!                                   └──render()──► Vec<DisplayBlock>
//! ```
//!
//! Both stages are pure and total: any payload produces a document, and any
//! document produces blocks. Section labels go through [`LabelTranslator`].

pub mod labels;
pub mod normalize;
pub mod render;

pub use labels::LabelTranslator;
pub use normalize::{BackendValue, ResponseSections, compose_response, normalize};
pub use render::{
    DisplayBlock, HeaderIcon, InlineSpan, InlineText, categorize, render, render_inline,
};
