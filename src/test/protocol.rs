#[cfg(test)]
mod tests {
    use crate::protocol::{
        AmrapParams, DeathByParams, E2momParams, EmomParams, HictParams, HiitParams, PhaseKind,
        Protocol, ProtocolError, ProtocolKind, TabataParams, intensity_percent,
    };
    use crate::test::test_client::{login_test_user, post_json, read_json, setup_test_client};
    use crate::test::test_db::create_standard_test_db;
    use rocket::http::Status;
    use serde_json::{Value, json};

    fn all_protocols() -> Vec<Protocol> {
        vec![
            Protocol::Hiit(HiitParams {
                work_seconds: 30,
                rest_seconds: 15,
                rounds: 4,
                exercise_count: 3,
            }),
            Protocol::Tabata(TabataParams::default()),
            Protocol::Tabata(TabataParams {
                sets: 3,
                ..TabataParams::default()
            }),
            Protocol::Hict(HictParams::default()),
            Protocol::Emom(EmomParams {
                total_minutes: 10,
                reps_per_minute: 10,
                seconds_per_rep: 3,
            }),
            Protocol::E2mom(E2momParams {
                total_minutes: 9,
                reps_per_interval: 15,
                seconds_per_rep: 4,
            }),
            Protocol::DeathBy(DeathByParams {
                max_minutes: 12,
                starting_reps: 1,
                rep_increment: 2,
                seconds_per_rep: 3,
            }),
            Protocol::Amrap(AmrapParams { total_minutes: 12 }),
        ]
    }

    #[test]
    fn test_hiit_formula() {
        let summary = Protocol::Hiit(HiitParams {
            work_seconds: 30,
            rest_seconds: 15,
            rounds: 4,
            exercise_count: 3,
        })
        .summary()
        .expect("valid HIIT");

        assert_eq!(summary.total_seconds, (30 + 15) * 4 * 3);
        assert_eq!(summary.work_seconds, 360);
        assert_eq!(summary.rest_seconds, 180);
        assert_eq!(summary.intensity_percent, 67);
        assert_eq!(summary.rounds, 4);
    }

    #[test]
    fn test_tabata_defaults_last_four_minutes() {
        let protocol: Protocol =
            serde_json::from_value(json!({ "protocol": "TABATA" })).expect("defaults apply");
        let summary = protocol.summary().expect("valid TABATA");

        assert_eq!(summary.protocol, ProtocolKind::Tabata);
        assert_eq!(summary.total_seconds, 240);
        assert_eq!(summary.work_seconds, 160);
        assert_eq!(summary.rest_seconds, 80);
        assert_eq!(summary.rounds, 8);
    }

    #[test]
    fn test_tabata_sets_add_recovery_between_sets() {
        let summary = Protocol::Tabata(TabataParams {
            sets: 2,
            ..TabataParams::default()
        })
        .summary()
        .expect("valid TABATA");

        assert_eq!(summary.total_seconds, 240 * 2 + 60);
    }

    #[test]
    fn test_hict_defaults() {
        let summary = Protocol::Hict(HictParams::default())
            .summary()
            .expect("valid HICT");

        assert_eq!(summary.total_seconds, 40 * 8 * 3 + 60 * 2);
        assert_eq!(summary.work_seconds, 30 * 8 * 3);
    }

    #[test]
    fn test_minute_based_protocols() {
        let emom = Protocol::Emom(EmomParams {
            total_minutes: 10,
            reps_per_minute: 10,
            seconds_per_rep: 3,
        })
        .summary()
        .expect("valid EMOM");
        assert_eq!(emom.total_seconds, 600);
        assert_eq!(emom.work_seconds, 300);
        assert_eq!(emom.intensity_percent, 50);

        // More reps than fit in a minute are capped at the whole minute.
        let capped = Protocol::Emom(EmomParams {
            total_minutes: 5,
            reps_per_minute: 30,
            seconds_per_rep: 3,
        })
        .summary()
        .expect("valid EMOM");
        assert_eq!(capped.work_seconds, capped.total_seconds);

        let e2mom = Protocol::E2mom(E2momParams {
            total_minutes: 9,
            reps_per_interval: 15,
            seconds_per_rep: 4,
        })
        .summary()
        .expect("valid E2MOM");
        assert_eq!(e2mom.rounds, 4);
        assert_eq!(e2mom.total_seconds, 480);
        assert_eq!(e2mom.work_seconds, 240);

        let death_by = Protocol::DeathBy(DeathByParams {
            max_minutes: 5,
            starting_reps: 1,
            rep_increment: 1,
            seconds_per_rep: 3,
        })
        .summary()
        .expect("valid DEATH_BY");
        assert_eq!(death_by.total_seconds, 300);
        assert_eq!(death_by.work_seconds, 3 + 6 + 9 + 12 + 15);

        let amrap = Protocol::Amrap(AmrapParams { total_minutes: 12 })
            .summary()
            .expect("valid AMRAP");
        assert_eq!(amrap.total_seconds, 720);
        assert_eq!(amrap.intensity_percent, 100);
    }

    #[test]
    fn test_out_of_range_parameters_are_rejected() {
        let err = Protocol::Hiit(HiitParams {
            work_seconds: 0,
            rest_seconds: 10,
            rounds: 3,
            exercise_count: 1,
        })
        .summary()
        .expect_err("zero work must fail");

        assert_eq!(
            err,
            ProtocolError::OutOfRange {
                name: "work_seconds",
                value: 0,
                min: 1,
                max: 3600,
            }
        );

        assert!(
            Protocol::E2mom(E2momParams {
                total_minutes: 1,
                reps_per_interval: 5,
                seconds_per_rep: 3,
            })
            .summary()
            .is_err()
        );

        assert!(
            Protocol::Tabata(TabataParams {
                cycles: 0,
                ..TabataParams::default()
            })
            .phases()
            .is_err()
        );
    }

    #[test]
    fn test_phases_sum_to_summary() {
        for protocol in all_protocols() {
            let summary = protocol.summary().expect("valid protocol");
            let phases = protocol.phases().expect("valid protocol");

            let total: u32 = phases.iter().map(|p| p.seconds).sum();
            let work: u32 = phases
                .iter()
                .filter(|p| p.kind == PhaseKind::Work)
                .map(|p| p.seconds)
                .sum();

            assert_eq!(total, summary.total_seconds, "{:?}", protocol.kind());
            assert_eq!(work, summary.work_seconds, "{:?}", protocol.kind());
            assert!(phases.iter().all(|p| p.seconds > 0));
        }
    }

    #[test]
    fn test_intensity_percent_rounds() {
        assert_eq!(intensity_percent(0, 0), 0);
        assert_eq!(intensity_percent(1, 3), 33);
        assert_eq!(intensity_percent(2, 3), 67);
        assert_eq!(intensity_percent(5, 5), 100);
    }

    #[rocket::async_test]
    async fn test_calculate_endpoint() {
        let (client, _db) = setup_test_client(create_standard_test_db().await).await;
        login_test_user(&client, "alice@example.com").await;

        let response = post_json(
            &client,
            "/api/protocols/calculate",
            json!({ "protocol": "HIIT", "work_seconds": 40, "rest_seconds": 20, "rounds": 5 }),
        )
        .await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = read_json(response).await;
        assert_eq!(body["protocol"], "HIIT");
        assert_eq!(body["total_seconds"], 300);
        assert_eq!(body["phases"].as_array().map(Vec::len), Some(10));

        let response = post_json(
            &client,
            "/api/protocols/calculate",
            json!({ "protocol": "AMRAP", "total_minutes": 0 }),
        )
        .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = post_json(
            &client,
            "/api/protocols/calculate",
            json!({ "protocol": "PILATES" }),
        )
        .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
    }
}
