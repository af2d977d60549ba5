//! Borrowed views of DuckDB `VARCHAR` rows.

use libduckdb_sys::duckdb_string_t;
use std::borrow::Cow;

/// Strings up to this many bytes are stored inside the `duckdb_string_t`.
const INLINE_CAPACITY: u32 = 12;

/// Bytes of one string row, without copying.
///
/// # Safety
///
/// `row` must be a non-NULL row of a `VARCHAR` vector that DuckDB keeps alive
/// for at least `'a`.
unsafe fn row_bytes<'a>(row: &'a duckdb_string_t) -> &'a [u8] {
    // SAFETY: both layouts start with the length.
    let len = unsafe { row.value.inlined.length };
    if len == 0 {
        return &[];
    }

    if len <= INLINE_CAPACITY {
        // SAFETY: inlined rows hold `len` initialized bytes in place.
        let inlined = unsafe { &row.value.inlined.inlined };
        unsafe { std::slice::from_raw_parts(inlined.as_ptr().cast::<u8>(), len as usize) }
    } else {
        // SAFETY: longer rows point at `len` bytes owned by the vector.
        let ptr = unsafe { row.value.pointer.ptr };
        unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize) }
    }
}

/// Movetext of one row. Valid UTF-8 is borrowed straight from the vector;
/// invalid sequences are replaced, which allocates.
///
/// # Safety
///
/// Same contract as [`row_bytes`]: callers check the row for NULL first.
pub unsafe fn decode_movetext<'a>(row: &'a duckdb_string_t) -> Cow<'a, str> {
    String::from_utf8_lossy(unsafe { row_bytes(row) })
}
