//! # TTML Processor: Decoder and Encoder for Word-Synced Lyric Documents
//!
//! This crate converts between TTML lyric files (Apple Music conventions plus the AMLL
//! vendor namespace) and the [`LyricDocument`](lyric_core::LyricDocument) model.
//!
//! - [`parse_ttml`] never fails. Malformed sub-trees are skipped and reported as warnings.
//! - [`generate_ttml`] writes a document back out. Decoding its output yields a document
//!   equal to the input apart from regenerated ids.
//!
//! ## Examples
//!
//! ```rust
//! use lyric_core::{TtmlGenerationOptions, TtmlParsingOptions};
//! use ttml_processor::{generate_ttml, parse_ttml};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ttml_content = r#"
//!     <tt xmlns="http://www.w3.org/ns/ttml">
//!       <body>
//!         <div>
//!           <p begin="00:00:05.000" end="00:00:10.000">
//!             <span begin="5.1s" end="5.5s">Hello</span> <span begin="5.6s" end="6.0s">world</span>
//!           </p>
//!         </div>
//!       </body>
//!     </tt>
//!     "#;
//!
//!     let parsed = parse_ttml(ttml_content, &TtmlParsingOptions::default());
//!     assert!(parsed.warnings.is_empty());
//!
//!     let line = &parsed.document.lines[0];
//!     assert_eq!(line.start_time, 5000);
//!     let texts: Vec<&str> = line.words.iter().map(|w| w.word.as_str()).collect();
//!     assert_eq!(texts, ["Hello", " ", "world"]);
//!
//!     let generated = generate_ttml(&parsed.document, &TtmlGenerationOptions::default())?;
//!     assert!(generated.contains(r#"<span begin="00:00:05.100" end="00:00:05.500">Hello</span>"#));
//!
//!     let reparsed = parse_ttml(&generated, &TtmlParsingOptions::default());
//!     assert!(reparsed.document.eq_ignoring_ids(&parsed.document));
//!     Ok(())
//! }
//! ```

pub mod generator;
pub mod parser;
pub mod utils;

pub use generator::generate_ttml;
pub use parser::{ParsedTtml, parse_ttml};
pub use utils::{format_timestamp, parse_timespan};
