//! Property-based serialization round-trip tests.
//!
//! Uses proptest to verify:
//! 1. Any valid `BatchUpdate` survives encode → decode round-trip.
//! 2. Any valid `TaskRecord` list survives encode → decode round-trip.
//! 3. Random bytes never cause a panic in decoding (return `Err` gracefully).

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use dayline_proto::batch::{BatchUpdate, PlacementUpdate};
use dayline_proto::codec;
use dayline_proto::task::{BucketKey, Placement, TaskId, TaskRecord};

// --- Arbitrary implementations for protocol types ---

/// Strategy for generating arbitrary `TaskId` values.
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating arbitrary `BucketKey` values.
///
/// Day ordinals are kept inside chrono's representable range.
fn arb_bucket_key() -> impl Strategy<Value = BucketKey> {
    prop_oneof![
        (-100_000i64..100_000).prop_map(|n| {
            let epoch = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
            BucketKey::Day(epoch + chrono::TimeDelta::days(n))
        }),
        Just(BucketKey::Unscheduled),
    ]
}

/// Strategy for generating arbitrary `Placement` values.
fn arb_placement() -> impl Strategy<Value = Placement> {
    (arb_bucket_key(), any::<u32>()).prop_map(|(bucket, order)| Placement::new(bucket, order))
}

/// Strategy for generating arbitrary `PlacementUpdate` values.
fn arb_placement_update() -> impl Strategy<Value = PlacementUpdate> {
    (arb_task_id(), arb_placement()).prop_map(|(id, placement)| PlacementUpdate::new(id, placement))
}

/// Strategy for generating arbitrary `BatchUpdate` values.
fn arb_batch() -> impl Strategy<Value = BatchUpdate> {
    prop::collection::vec(arb_placement_update(), 0..32).prop_map(BatchUpdate::new)
}

/// Strategy for generating arbitrary `TaskRecord` values.
fn arb_task_record() -> impl Strategy<Value = TaskRecord> {
    (
        arb_task_id(),
        arb_bucket_key(),
        any::<u32>(),
        "[^\x00]{0,256}",
        any::<bool>(),
        any::<u64>(),
    )
        .prop_map(|(id, bucket, order, title, done, created_at)| TaskRecord {
            id,
            bucket,
            order,
            title,
            done,
            created_at,
        })
}

// --- Property tests ---

proptest! {
    /// Any valid BatchUpdate survives an encode → decode round-trip.
    #[test]
    fn batch_round_trip(batch in arb_batch()) {
        let bytes = codec::encode_batch(&batch).expect("encode should succeed");
        let decoded = codec::decode_batch(&bytes).expect("decode should succeed");
        prop_assert_eq!(batch, decoded);
    }

    /// Any valid TaskRecord list survives an encode → decode round-trip.
    #[test]
    fn records_round_trip(records in prop::collection::vec(arb_task_record(), 0..16)) {
        let bytes = codec::encode_records(&records).expect("encode should succeed");
        let decoded = codec::decode_records(&bytes).expect("decode should succeed");
        prop_assert_eq!(records, decoded);
    }

    /// `touched_buckets` is stable across a serialization round-trip.
    #[test]
    fn touched_buckets_survive_round_trip(batch in arb_batch()) {
        let bytes = codec::encode_batch(&batch).expect("encode should succeed");
        let decoded = codec::decode_batch(&bytes).expect("decode should succeed");
        prop_assert_eq!(batch.touched_buckets(), decoded.touched_buckets());
    }

    /// Random bytes never cause a panic when decoded as a batch.
    #[test]
    fn random_bytes_decode_batch_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        // We don't care if it returns Ok or Err, just that it doesn't panic.
        let _ = codec::decode_batch(&bytes);
    }

    /// Random bytes never cause a panic when decoded as records.
    #[test]
    fn random_bytes_decode_records_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = codec::decode_records(&bytes);
    }

    /// Bucket keys display and parse back to the same value.
    #[test]
    fn bucket_key_display_parse_round_trip(bucket in arb_bucket_key()) {
        let display = bucket.to_string();
        prop_assert_eq!(BucketKey::parse(&display), Some(bucket));
    }
}
