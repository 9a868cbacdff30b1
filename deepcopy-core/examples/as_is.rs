//! Copies a value whose field type is shared rather than walked.
//!
//! Run with: `cargo run -p deepcopy-core --example as_is`

use chrono::{NaiveDate, NaiveDateTime};
use deepcopy_core::{copy, reflected, CopyError, CopyOption};

#[reflected]
struct Opaque {
    a: String,
    b: String,
}

#[reflected]
struct Record {
    pointer: Opaque,
    at: NaiveDateTime,
}

fn main() -> Result<(), CopyError> {
    let at = NaiveDate::from_ymd_opt(2019, 3, 25)
        .and_then(|date| date.and_hms_opt(11, 33, 59))
        .unwrap_or_default();
    let orig = Record {
        pointer: Opaque {
            a: String::from("AAAA"),
            b: String::from("BBBB"),
        },
        at,
    };

    let mut clone = Record::default();
    copy(&orig, &mut clone, &[CopyOption::as_is::<Opaque>()])?;

    println!("orig: {orig:?}\ncopy: {clone:?}");
    Ok(())
}
