#![forbid(unsafe_code)]

//! Headless host and grid snapshots for slotgrid tests.
//!
//! - **Headless host**: [`HeadlessHost`] implements the host and scheduler
//!   traits in memory, with an explicit foreground queue.
//! - **Grid text**: [`grid_to_text`] renders a container as rows of nine
//!   cells for readable assertions.
//!
//! # Quick Start
//!
//! ```ignore
//! use slotgrid_harness::{assert_grid, init_test_logging, HeadlessHost};
//!
//! #[test]
//! fn border_renders() {
//!     init_test_logging();
//!     let host = Arc::new(HeadlessHost::new());
//!     // ... open a menu ...
//!     assert_grid!(&*container, "ppppppppp");
//! }
//! ```

pub mod container;
pub mod host;
pub mod stack;
pub mod viewer;

use std::fmt::Write as FmtWrite;

use slotgrid_core::{Container, GRID_COLUMNS, SlotContent};

pub use container::HeadlessContainer;
pub use host::HeadlessHost;
pub use stack::Stack;
pub use viewer::{HeadlessViewer, INVENTORY_SIZE};

// ============================================================================
// Container → Text Conversion
// ============================================================================

/// Convert a container to a plain text grid.
///
/// Each grid row becomes one line of up to nine characters. Empty slots
/// become `.`, any other slot shows the first character of its material,
/// uppercased when the stack carries the ownership tag.
pub fn grid_to_text<K>(container: &K) -> String
where
    K: Container<Content = Stack>,
{
    let size = container.size();
    let columns = GRID_COLUMNS as usize;
    let mut out = String::with_capacity(size + size / columns);

    for slot in 0..size {
        if slot > 0 && slot % columns == 0 {
            out.push('\n');
        }
        out.push(cell_char(&container.get(slot)));
    }
    out
}

fn cell_char(stack: &Stack) -> char {
    if stack.is_empty() {
        return '.';
    }
    let first = stack.material().chars().next().unwrap_or('?');
    if stack.is_owned() {
        first.to_ascii_uppercase()
    } else {
        first
    }
}

// ============================================================================
// Diff
// ============================================================================

/// Compute a simple line-by-line diff between two text grids.
///
/// Lines prefixed with ` ` match, `-` only appear in `expected`, `+` only in
/// `actual`. Returns an empty string when the inputs are identical.
pub fn diff_text(expected: &str, actual: &str) -> String {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();

    let max_lines = expected_lines.len().max(actual_lines.len());
    let mut out = String::new();
    let mut has_diff = false;

    for i in 0..max_lines {
        let exp = expected_lines.get(i).copied();
        let act = actual_lines.get(i).copied();

        let line = match (exp, act) {
            (Some(e), Some(a)) if e == a => writeln!(out, " {e}"),
            (Some(e), Some(a)) => {
                has_diff = true;
                writeln!(out, "-{e}").and_then(|()| writeln!(out, "+{a}"))
            }
            (Some(e), None) => {
                has_diff = true;
                writeln!(out, "-{e}")
            }
            (None, Some(a)) => {
                has_diff = true;
                writeln!(out, "+{a}")
            }
            (None, None) => Ok(()),
        };
        // Writing to a String cannot fail.
        debug_assert!(line.is_ok());
    }

    if has_diff { out } else { String::new() }
}

// ============================================================================
// Grid Assertion
// ============================================================================

/// Assert that a container renders to `expected`.
///
/// Leading and trailing whitespace of every expected line is ignored so
/// grids can be written as indented raw strings.
///
/// # Panics
///
/// When the grids differ, with a line diff in the message.
pub fn assert_grid_text<K>(container: &K, expected: &str)
where
    K: Container<Content = Stack>,
{
    let actual = grid_to_text(container);
    let expected = expected
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if expected != actual {
        let diff = diff_text(&expected, &actual);
        panic!(
            "\n\
             === Grid mismatch ===\n\
             Diff (- expected, + actual):\n{diff}"
        );
    }
}

/// Assert that a container matches an inline text grid.
///
/// ```ignore
/// assert_grid!(&*container, "
///     PPPPPPPPP
///     P.......P
/// ");
/// ```
#[macro_export]
macro_rules! assert_grid {
    ($container:expr, $expected:expr) => {
        $crate::assert_grid_text($container, $expected)
    };
}

// ============================================================================
// Logging
// ============================================================================

/// Install a `tracing` subscriber for tests, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
