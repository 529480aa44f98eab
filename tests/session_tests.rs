// SPDX-License-Identifier: MPL-2.0

//! Integration tests for session routing and deletion

use photobooth::EncodedImage;
use photobooth::session::{CaptureOutcome, PhotoMode, Session, StripCount, StripProgress};

fn image(tag: u32) -> EncodedImage {
    EncodedImage {
        data: vec![tag as u8],
        width: tag,
        height: 1,
    }
}

#[test]
fn test_strip_counts_for_any_capture_count() {
    for count in [StripCount::Three, StripCount::Four] {
        let k = count.get();
        for n in 0..13 {
            let mut session = Session::new(PhotoMode::Strip, count);
            for i in 0..n {
                session.record_capture(image(i as u32));
            }
            assert_eq!(session.current_strip_photos().len(), n % k, "n={} k={}", n, k);
            assert_eq!(session.strips().len(), n / k, "n={} k={}", n, k);
            assert!(session.photos().is_empty());
        }
    }
}

#[test]
fn test_four_photo_strip_scenario() {
    let mut session = Session::new(PhotoMode::Strip, StripCount::Four);
    let mut last = None;
    for i in 1..=4 {
        last = Some(session.record_capture(image(i)));
    }
    let Some(CaptureOutcome::StripCompleted { id }) = last else {
        panic!("fourth capture should complete the strip");
    };
    assert_eq!(session.strips().len(), 1);
    let strip = session.strip(&id).unwrap();
    let order: Vec<u32> = strip.photos().iter().map(|p| p.image.width).collect();
    assert_eq!(order, vec![1, 2, 3, 4]);
    assert!(session.current_strip_photos().is_empty());
    assert_eq!(session.progress(), StripProgress { taken: 0, target: 4 });
}

#[test]
fn test_delete_keeps_others_in_order() {
    let mut session = Session::new(PhotoMode::Single, StripCount::Four);
    let ids: Vec<String> = (1..=4)
        .map(|i| match session.record_capture(image(i)) {
            CaptureOutcome::Photo { id } => id,
            other => panic!("unexpected outcome {:?}", other),
        })
        .collect();

    let removed = session.delete_photo(&ids[1]).unwrap();
    assert_eq!(removed.image.width, 2);
    let remaining: Vec<u32> = session.photos().iter().map(|p| p.image.width).collect();
    assert_eq!(remaining, vec![4, 3, 1]);
    assert!(session.delete_photo(&ids[1]).is_err());
}

#[test]
fn test_delete_strip_keeps_others() {
    let mut session = Session::new(PhotoMode::Strip, StripCount::Three);
    for i in 0..9 {
        session.record_capture(image(i));
    }
    let ids: Vec<String> = session.strips().iter().map(|s| s.id().to_string()).collect();
    session.delete_strip(&ids[1]).unwrap();
    let remaining: Vec<&str> = session.strips().iter().map(|s| s.id()).collect();
    assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);
}

#[test]
fn test_mode_switch_keeps_strip_in_progress() {
    let mut session = Session::new(PhotoMode::Strip, StripCount::Three);
    session.record_capture(image(1));
    session.set_mode(PhotoMode::Single);
    session.record_capture(image(2));
    assert_eq!(session.photos().len(), 1);
    assert_eq!(session.current_strip_photos().len(), 1);
    session.set_mode(PhotoMode::Strip);
    assert_eq!(
        session.record_capture(image(3)),
        CaptureOutcome::StripPhotoAdded(StripProgress { taken: 2, target: 3 })
    );
}
