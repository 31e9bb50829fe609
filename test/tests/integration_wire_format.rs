//! Property tests for the delta wire format: round-trip fidelity, rejection
//! of truncated messages, and completeness of the per-frame diff scan.

use proptest::prelude::*;

use roomsync_shared::{collect_updates, decode_records, encode_records, DeltaRecord, UNWRITTEN};

fn record_strategy() -> impl Strategy<Value = DeltaRecord> {
    (any::<u32>(), any::<i16>()).prop_map(|(index, value)| DeltaRecord { index, value })
}

proptest! {
    #[test]
    fn round_trip_preserves_records_and_order(
        records in proptest::collection::vec(record_strategy(), 0..64)
    ) {
        let bytes = encode_records(&records);
        prop_assert_eq!(decode_records(&bytes).unwrap(), records);
    }

    #[test]
    fn truncating_the_last_byte_is_always_rejected(
        records in proptest::collection::vec(record_strategy(), 1..64)
    ) {
        let mut bytes = encode_records(&records);
        bytes.pop();
        prop_assert!(decode_records(&bytes).is_err());
    }

    #[test]
    fn diff_collection_emits_exactly_the_written_cells(
        writes in proptest::collection::btree_map(
            0usize..256,
            any::<i16>().prop_filter("not the sentinel", |&v| i32::from(v) != UNWRITTEN),
            0..32,
        )
    ) {
        let mut buffer = vec![UNWRITTEN; 256];
        for (&index, &value) in &writes {
            buffer[index] = i32::from(value);
        }

        let records = collect_updates(&buffer);

        prop_assert_eq!(records.len(), writes.len());
        // a BTreeMap iterates in ascending key order, as the scan must
        for (record, (&index, &value)) in records.iter().zip(writes.iter()) {
            prop_assert_eq!(record.index as usize, index);
            prop_assert_eq!(record.value, value);
        }
    }

    #[test]
    fn encoding_never_exceeds_the_per_record_bound(
        records in proptest::collection::vec(record_strategy(), 0..64)
    ) {
        let bytes = encode_records(&records);
        prop_assert!(bytes.len() <= records.len() * roomsync_shared::MAX_RECORD_BYTES);
    }
}
