//! Property-based checks of the quantified invariants that aren't
//! convenient to pin down with a handful of example-based unit tests:
//! seat layout length bounds, adventure-log retention, and hex-color
//! validation over arbitrary inputs.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use tabletop_tavern_core::domain::LogType;
use tabletop_tavern_core::metrics::Metrics;
use tabletop_tavern_core::server::{AdventureLogService, CreateRoomInput, RoomService};
use tabletop_tavern_core::store::memory::InMemoryRoomStore;

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("failed to build tokio runtime")
}

proptest! {
    /// A layout no longer than `max_players` is always accepted and never
    /// grows in storage; anything longer is always rejected, for every
    /// room size in range.
    #[test]
    fn seat_layout_respects_max_players_bound(max_players in 1u8..=8, overflow in 1usize..6) {
        let outcome: Result<(), TestCaseError> = rt().block_on(async move {
            let svc = RoomService::new(Arc::new(InMemoryRoomStore::new()));
            let room = svc
                .create_room(
                    CreateRoomInput { max_players, ..Default::default() },
                    Some("room-1".to_string()),
                )
                .await
                .unwrap();

            let exact: Vec<String> = (0..max_players as usize).map(|i| format!("p{i}")).collect();
            let accepted = svc.update_seat_layout(&room, exact).await;
            prop_assert!(accepted.is_ok());
            prop_assert_eq!(accepted.unwrap().seat_layout.len(), max_players as usize);

            let oversized: Vec<String> = (0..max_players as usize + overflow)
                .map(|i| format!("p{i}"))
                .collect();
            let rejected = svc.update_seat_layout(&room, oversized).await;
            prop_assert!(rejected.is_err());
            Ok(())
        });
        outcome?;
    }

    /// Regardless of write burst size, the room's adventure log never
    /// holds more than `max_logs` entries once every insert has settled.
    #[test]
    fn adventure_log_stays_within_retention_bound(max_logs in 1usize..12, inserts in 0usize..40) {
        let outcome: Result<(), TestCaseError> = rt().block_on(async move {
            let svc = AdventureLogService::new(
                Arc::new(InMemoryRoomStore::new()),
                Arc::new(Metrics::new()),
                max_logs,
            );
            let room = "room-1".to_string();
            for i in 0..inserts {
                svc.add_entry(&room, format!("entry {i}"), LogType::System, None, None)
                    .await
                    .unwrap();
            }
            let (page, total) = svc.get_room_logs(&room, usize::MAX, 0).await.unwrap();
            prop_assert!(page.len() <= max_logs);
            prop_assert!(total <= max_logs);
            Ok(())
        });
        outcome?;
    }

    /// `update_seat_colors` accepts a color if and only if it is a
    /// 7-character `#RRGGBB` string, for arbitrary candidate strings
    /// (not just hand-picked valid/invalid examples).
    #[test]
    fn seat_color_validation_matches_hex_format(candidate in "#?[0-9a-zA-Z]{0,8}") {
        let looks_like_hex = candidate.len() == 7
            && candidate.starts_with('#')
            && candidate[1..].bytes().all(|b| b.is_ascii_hexdigit());

        let outcome: Result<(), TestCaseError> = rt().block_on(async move {
            let svc = RoomService::new(Arc::new(InMemoryRoomStore::new()));
            let room = svc
                .create_room(
                    CreateRoomInput { max_players: 2, ..Default::default() },
                    Some("room-1".to_string()),
                )
                .await
                .unwrap();

            let mut colors = BTreeMap::new();
            colors.insert("0".to_string(), candidate.clone());
            let result = svc.update_seat_colors(&room, colors).await;
            prop_assert_eq!(result.is_ok(), looks_like_hex);
            Ok(())
        });
        outcome?;
    }
}
