use std::fmt;

/// Wrap a formatting closure into a value implementing `Display`.
pub fn display_fn(f: impl Fn(&mut fmt::Formatter<'_>) -> fmt::Result) -> impl fmt::Display {
    DisplayFn(f)
}

struct DisplayFn<F>(F);
impl<F> fmt::Display for DisplayFn<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(formatter)
    }
}

/// Join the `Display` forms of `items` with `sep`.
pub fn join<'a, T>(items: &'a [T], sep: &'a str) -> impl fmt::Display + 'a
where
    T: fmt::Display,
{
    display_fn(move |f| {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    })
}

/// Narrow a collection index into a 32-bit ID.
///
/// Panics when the index does not fit, rather than aliasing another ID.
pub fn to_id(index: usize) -> u32 {
    assert!(
        index <= u32::MAX as usize,
        "the number of IDs exceeds {}",
        u32::MAX
    );
    index as u32
}
