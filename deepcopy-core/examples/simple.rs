//! Copies a struct holding a pointer; the clone gets its own allocation.
//!
//! Run with: `cargo run -p deepcopy-core --example simple`

use deepcopy_core::{copy, reflected, CopyError, Ptr};

#[reflected]
struct Point {
    a: String,
    b: String,
}

#[reflected]
struct Holder {
    pointer: Ptr<Point>,
}

fn main() -> Result<(), CopyError> {
    let orig = Holder {
        pointer: Ptr::new(Point {
            a: String::from("AAAA"),
            b: String::from("BBBB"),
        }),
    };

    let mut clone = Holder::default();
    copy(&orig, &mut clone, &[])?;

    println!("orig: {orig:?}\ncopy: {clone:?}");
    println!(
        "orig: {:?}\ncopy: {:?}",
        *orig.pointer.borrow(),
        *clone.pointer.borrow()
    );
    Ok(())
}
