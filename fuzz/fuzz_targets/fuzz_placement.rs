#![no_main]
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};
use stashkit::{FirstFitAllocator, Footprint, GridAllocator, GridDimensions, Rect};

#[derive(Debug, Arbitrary)]
struct Request {
    width: u8,
    height: u8,
}

// Every placement must stay in bounds and overlap nothing already placed
fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let (rows, cols): (u8, u8) = match u.arbitrary() {
        Ok(dims) => dims,
        Err(_) => return,
    };
    let requests: Vec<Request> = match u.arbitrary() {
        Ok(requests) => requests,
        Err(_) => return,
    };

    let dims = GridDimensions::new(rows % 17, cols % 17);
    let alloc = FirstFitAllocator::new(dims);
    let mut occupied: Vec<Rect> = Vec::new();

    for request in requests.iter().take(128) {
        let footprint = Footprint::new(request.width % 6, request.height % 6);
        if let Some(spot) = alloc.find_spot(footprint, &occupied) {
            let rect = Rect::new(spot, footprint);
            assert!(rect.within(dims));
            assert!(occupied.iter().all(|r| !r.intersects(&rect)));
            occupied.push(rect);
        }
    }
});
