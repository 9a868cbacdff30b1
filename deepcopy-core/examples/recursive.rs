//! Copies a graph whose pointee points back at its owner.
//!
//! Run with: `cargo run -p deepcopy-core --example recursive`

use deepcopy_core::{deep_copy, reflected, CopyError, CopyOption, Ptr};

#[reflected]
struct Link {
    a: String,
    b: String,
    back: Ptr<Node>,
}

#[reflected]
struct Node {
    pointer: Ptr<Link>,
}

fn main() -> Result<(), CopyError> {
    let orig = Ptr::new(Node {
        pointer: Ptr::new(Link {
            a: String::from("AAAA"),
            b: String::from("BBBB"),
            back: Ptr::null(),
        }),
    });
    orig.borrow().pointer.borrow_mut().back = orig.clone();

    let clone = deep_copy(&orig, &[CopyOption::CycleDetection])?;

    println!("orig pointer: {orig:?}\ncopy pointer: {clone:?}");
    {
        let orig_link = orig.borrow().pointer.clone();
        let clone_link = clone.borrow().pointer.clone();
        println!(
            "orig: {:?}\ncopy: {:?}",
            *orig_link.borrow(),
            *clone_link.borrow()
        );
        println!(
            "copy points back at itself: {}",
            clone_link.borrow().back.ptr_eq(&clone)
        );
    }

    for node in [&orig, &clone] {
        node.borrow().pointer.borrow_mut().back = Ptr::null();
    }
    Ok(())
}
