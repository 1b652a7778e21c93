//! # htmldown-gfm
//!
//! GitHub Flavored Markdown extensions for [`htmldown`], layered through
//! the converter's plugin mechanism.
//!
//! ```rust
//! use htmldown::Converter;
//!
//! let mut converter = Converter::new();
//! converter.use_plugin(htmldown_gfm::plugin);
//!
//! let markdown = converter
//!     .convert_html("<p>was <del>wrong</del></p>")
//!     .unwrap();
//! assert_eq!(markdown, "was ~~wrong~~");
//! ```

mod inline;
mod tables;

use htmldown::Converter;

/// Register every GFM extension.
pub fn plugin(converter: &mut Converter) {
    tables(converter);
    strikethrough(converter);
    task_list_items(converter);
}

/// Register the table rules and the caption relocation hook.
pub fn tables(converter: &mut Converter) {
    converter.before(tables::hoist_captions);
    converter.add_rules(tables::table_rules());
}

/// Register `del`/`s`/`strike` conversion.
pub fn strikethrough(converter: &mut Converter) {
    converter.add_rules(inline::strikethrough_rules());
}

/// Register checkbox conversion for task list items.
pub fn task_list_items(converter: &mut Converter) {
    converter.add_rules(inline::task_list_rules());
}
