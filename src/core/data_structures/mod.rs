/*!
 * Data Structures
 *
 * Small specialized containers shared by the kernel objects.
 */

mod inline_string;

pub use inline_string::InlineString;
