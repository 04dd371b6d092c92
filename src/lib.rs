//! # docx-template
//!
//! Fill `{placeholder}` variables in Word (.docx) templates.
//!
//! Placeholders are replaced in the document body, the first two headers and
//! the first two footers. Placeholders that Word has split across several
//! formatting runs are joined before matching.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docx_template::{fill_file, Variables};
//!
//! let vars: Variables = [("name", "Alice"), ("city", "Oslo")].into_iter().collect();
//! fill_file("invitation.docx", "invitation-alice.docx", &vars)?;
//! # Ok::<(), docx_template::Error>(())
//! ```
//!
//! ## Working with parts
//!
//! ```no_run
//! use docx_template::{DocxTemplate, Part, TemplateOptions, Variables};
//!
//! let options = TemplateOptions::new().with_temp_dir("/var/tmp")?;
//! let mut template = DocxTemplate::open_with_options("invoice.docx", &options)?;
//!
//! println!("{}", template.get_part(Part::Header1)?);
//! for key in template.all_variables()?.keys() {
//!     println!("needs {}", key);
//! }
//!
//! let vars = Variables::from_json(r#"{"number": "2024-001"}"#)?;
//! template.set_data(&vars, true)?;
//! template.save("invoice-2024-001.docx")?;
//! # Ok::<(), docx_template::Error>(())
//! ```

pub mod container;
pub mod error;
pub mod options;
pub mod part;
pub mod placeholder;
pub mod template;
pub mod variables;

// Re-exports
pub use container::DocxContainer;
pub use error::{Error, Result};
pub use options::TemplateOptions;
pub use part::Part;
pub use placeholder::Substitution;
pub use template::DocxTemplate;
pub use variables::Variables;

use std::path::Path;

/// Fill a template and write the result to `output`.
///
/// Placeholders without a value are left as they are.
///
/// # Example
///
/// ```no_run
/// use docx_template::{fill_file, Variables};
///
/// let vars: Variables = [("name", "Alice")].into_iter().collect();
/// fill_file("letter.docx", "out.docx", &vars)?;
/// # Ok::<(), docx_template::Error>(())
/// ```
pub fn fill_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    vars: &Variables,
) -> Result<()> {
    fill_file_with_options(input, output, vars, &TemplateOptions::default())
}

/// Fill a template with options and write the result to `output`.
///
/// # Example
///
/// ```no_run
/// use docx_template::{fill_file_with_options, TemplateOptions, Variables};
///
/// let options = TemplateOptions::new().with_fill_all_gaps(true);
/// let vars: Variables = [("name", "Alice")].into_iter().collect();
/// fill_file_with_options("letter.docx", "out.docx", &vars, &options)?;
/// # Ok::<(), docx_template::Error>(())
/// ```
pub fn fill_file_with_options(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    vars: &Variables,
    options: &TemplateOptions,
) -> Result<()> {
    let mut template = DocxTemplate::open_with_options(input, options)?;
    template.set_data(vars, options.fill_all_gaps)?;
    template.save(output)
}

/// List the placeholder keys a template uses, in order of first appearance.
///
/// # Example
///
/// ```no_run
/// let vars = docx_template::list_variables("letter.docx")?;
/// for key in vars.keys() {
///     println!("{}", key);
/// }
/// # Ok::<(), docx_template::Error>(())
/// ```
pub fn list_variables(path: impl AsRef<Path>) -> Result<Variables> {
    DocxTemplate::open(path)?.all_variables()
}
