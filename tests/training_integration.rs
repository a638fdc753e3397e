//! Integration tests for the training manager.
//!
//! Exercises module completion rewards, replay idempotence, session
//! persistence, the completed-scenario log, activity recording, and the
//! leaderboard against the in-memory document store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use veritas_core::profile::{NewProfile, ProfileManager, SkillLevel};
use veritas_core::store::{DocumentStore, MemoryStore};
use veritas_core::training::{
    AnalysisRecord, CompletedScenario, ModuleProgress, TrainingManager,
};

fn setup() -> (TrainingManager, ProfileManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let profiles = ProfileManager::new(store.clone());
    let training = TrainingManager::new(store.clone(), profiles.clone());
    (training, profiles, store)
}

async fn create_user(profiles: &ProfileManager, user_id: &str) {
    profiles
        .create_profile(
            user_id,
            &NewProfile {
                email: format!("{user_id}@example.com"),
                display_name: format!("User {user_id}"),
                photo_url: None,
            },
        )
        .await
        .expect("Failed to create profile");
}

#[tokio::test]
async fn test_first_completion_awards_points_and_achievements() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    training
        .complete_module("u1", "basic-fact-checking", 30, 8)
        .await
        .expect("Failed to complete module");

    // 100 base + floor(30 / 2) accuracy bonus, no speed bonus at 8 minutes.
    // The 115 points cross the level-1 threshold, adding the level-2
    // achievement bonus of 100.
    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.total_points, 215);
    assert_eq!(profile.level, 2);
    assert_eq!(profile.training_stats.points_earned, 115);
    assert!(profile.achievements.iter().any(|a| a.id == "level-2"));

    let progress = training.get_user_progress("u1").await.unwrap().unwrap();
    assert_eq!(progress.completed_modules, vec!["basic-fact-checking"]);
    assert_eq!(progress.current_score, 30);
    assert_eq!(progress.total_time, 8);
    assert_eq!(progress.skill_level, SkillLevel::Beginner);
    assert!(progress.achievements.contains(&"first-module".to_string()));
}

#[tokio::test]
async fn test_replay_accumulates_stats_without_rewards() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    training
        .complete_module("u1", "basic-fact-checking", 30, 8)
        .await
        .unwrap();
    let points_after_first = profiles
        .get_profile("u1")
        .await
        .unwrap()
        .unwrap()
        .total_points;

    training
        .complete_module("u1", "basic-fact-checking", 20, 3)
        .await
        .unwrap();

    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(
        profile.total_points, points_after_first,
        "replay must not award points"
    );

    let progress = training.get_user_progress("u1").await.unwrap().unwrap();
    assert_eq!(progress.completed_modules.len(), 1, "no duplicate entry");
    assert_eq!(progress.current_score, 50, "score still accumulates");
    assert_eq!(progress.total_time, 11, "time still accumulates");
}

#[tokio::test]
async fn test_speed_bonus_under_five_minutes() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    training
        .complete_module("u1", "source-evaluation", 40, 4)
        .await
        .unwrap();

    // 100 base + 20 accuracy + 25 speed.
    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.training_stats.points_earned, 145);
}

#[tokio::test]
async fn test_completing_a_module_without_a_profile_fails() {
    let (training, _, _) = setup();

    let result = training
        .complete_module("ghost", "basic-fact-checking", 30, 8)
        .await;
    assert!(result.is_err(), "point award requires an existing profile");
}

#[tokio::test]
async fn test_tier_promotion_unlocks_milestone_achievements() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    let path = [
        "basic-fact-checking",
        "source-evaluation",
        "emotional-manipulation",
        "statistical-misinformation",
        "visual-manipulation",
    ];
    for module_id in path {
        training.complete_module("u1", module_id, 50, 10).await.unwrap();
    }

    let progress = training.get_user_progress("u1").await.unwrap().unwrap();
    assert_eq!(progress.skill_level, SkillLevel::Intermediate);
    assert!(progress.achievements.contains(&"all-beginner".to_string()));
    assert!(
        progress.achievements.contains(&"level-up".to_string()),
        "tier change earns the level-up milestone"
    );
}

#[tokio::test]
async fn test_save_module_progress_omits_end_time_until_finalized() {
    let (training, profiles, store) = setup();
    create_user(&profiles, "u1").await;

    let start = Utc::now();
    let mut session = ModuleProgress::start("basic-fact-checking", start);
    session.current_scenario = 2;
    session.completed_scenarios = vec!["s1".to_string(), "s2".to_string()];
    session.score = 20;
    session.mistakes = 1;

    training.save_module_progress("u1", &session).await.unwrap();

    let raw = store
        .get("userProgress", "u1")
        .await
        .unwrap()
        .expect("progress document");
    let stored = raw
        .pointer("/moduleProgress/basic-fact-checking")
        .expect("module entry");
    assert!(stored.get("endTime").is_none(), "unfinished session");
    assert_eq!(stored["score"], json!(20));

    session.finalize(start + Duration::minutes(12));
    training.save_module_progress("u1", &session).await.unwrap();

    let reloaded = training
        .get_module_progress("u1", "basic-fact-checking")
        .await
        .unwrap()
        .expect("module progress");
    assert!(reloaded.end_time.is_some());
    assert_eq!(reloaded.time_spent, 12);
    assert_eq!(reloaded.accuracy, 50);
}

#[tokio::test]
async fn test_scenario_log_ordering_and_exclusion() {
    let (training, profiles, store) = setup();
    create_user(&profiles, "u1").await;

    let now = Utc::now();
    for (i, scenario_id) in ["s1", "s2", "s3"].iter().enumerate() {
        let record = CompletedScenario {
            scenario_id: scenario_id.to_string(),
            module_id: "basic-fact-checking".to_string(),
            user_id: "u1".to_string(),
            completed_at: now - Duration::minutes(10 - i as i64),
            score: 10,
            time_spent: 2,
            hints_used: 0,
            was_correct: true,
        };
        training.record_completed_scenario(&record).await.unwrap();
    }

    // A record from another module, and one from another user.
    training
        .record_completed_scenario(&CompletedScenario {
            scenario_id: "other-module".to_string(),
            module_id: "source-evaluation".to_string(),
            user_id: "u1".to_string(),
            completed_at: now,
            score: 10,
            time_spent: 2,
            hints_used: 0,
            was_correct: true,
        })
        .await
        .unwrap();
    training
        .record_completed_scenario(&CompletedScenario {
            scenario_id: "not-mine".to_string(),
            module_id: "basic-fact-checking".to_string(),
            user_id: "u2".to_string(),
            completed_at: now,
            score: 10,
            time_spent: 2,
            hints_used: 0,
            was_correct: false,
        })
        .await
        .unwrap();

    // A malformed record (missing scenarioId) must be skipped, not fail
    // the read.
    store
        .set(
            "completedScenarios",
            "malformed",
            json!({
                "userId": "u1",
                "moduleId": "basic-fact-checking",
                "completedAt": now.to_rfc3339(),
            }),
            false,
        )
        .await
        .unwrap();

    let records = training
        .get_completed_scenarios("u1", Some("basic-fact-checking"))
        .await
        .unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.scenario_id.as_str()).collect();
    assert_eq!(ids, vec!["s3", "s2", "s1"], "most recent first");

    let excluded = training
        .excluded_scenario_ids("u1", "basic-fact-checking")
        .await
        .unwrap();
    assert_eq!(excluded.len(), 3);
    assert!(excluded.contains("s2"));
    assert!(!excluded.contains("other-module"));
}

#[tokio::test]
async fn test_analyzer_activity_awards_points_and_tracks_stats() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    training
        .record_analyzer_activity("u1", Some(0.9))
        .await
        .unwrap();

    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    // 25 base + 15 high-accuracy bonus.
    assert_eq!(profile.analyzer_stats.points_earned, 40);
    assert_eq!(profile.analyzer_stats.total_analyses, 1);
    assert_eq!(profile.analyzer_stats.accurate_detections, 1);
    assert!((profile.analyzer_stats.average_confidence - 0.9).abs() < 1e-9);

    training.record_analyzer_activity("u1", None).await.unwrap();

    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.analyzer_stats.points_earned, 65);
    assert_eq!(profile.analyzer_stats.total_analyses, 2);
    assert_eq!(profile.analyzer_stats.accurate_detections, 1);
    assert!((profile.analyzer_stats.average_confidence - 0.45).abs() < 1e-9);
}

#[tokio::test]
async fn test_verifier_activity_awards_points_and_tracks_stats() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    training
        .record_verifier_activity("u1", true, 0.95)
        .await
        .unwrap();
    training
        .record_verifier_activity("u1", false, 0.4)
        .await
        .unwrap();

    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    // (20 + 10 high-confidence) + 20.
    assert_eq!(profile.verifier_stats.points_earned, 50);
    assert_eq!(profile.verifier_stats.total_verifications, 2);
    assert_eq!(profile.verifier_stats.accurate_verifications, 1);
}

#[tokio::test]
async fn test_activity_recording_without_profile_is_a_no_op() {
    let (training, _, store) = setup();

    training
        .record_analyzer_activity("ghost", Some(0.9))
        .await
        .expect("missing profile must not be an error");
    training
        .record_verifier_activity("ghost", true, 0.9)
        .await
        .expect("missing profile must not be an error");

    let doc = store.get("userProfiles", "ghost").await.unwrap();
    assert!(doc.is_none(), "activity recording never creates profiles");
}

#[tokio::test]
async fn test_leaderboard_orders_by_points_and_tolerates_partial_docs() {
    let (training, profiles, store) = setup();

    for (user_id, points) in [("u1", 30u32), ("u2", 90), ("u3", 60)] {
        create_user(&profiles, user_id).await;
        profiles
            .add_points(user_id, points, veritas_core::profile::PointCategory::Training)
            .await
            .unwrap();
    }

    // A partial document from an older client: no display name, no level.
    store
        .set(
            "userProfiles",
            "legacy",
            json!({
                "userId": "legacy",
                "email": "old.timer@example.com",
                "totalPoints": 45,
            }),
            false,
        )
        .await
        .unwrap();

    let top = training.leaderboard(3).await.unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].user_id, "u2");
    assert_eq!(top[1].user_id, "u3");
    assert_eq!(top[2].user_id, "legacy");
    assert_eq!(top[2].display_name, "old.timer");
    assert_eq!(top[2].level, 1, "missing level defaults to 1");
}

#[tokio::test]
async fn test_analysis_history_is_created_lazily_and_appended() {
    let (training, profiles, _) = setup();
    create_user(&profiles, "u1").await;

    assert!(
        training.get_analysis_history("u1").await.unwrap().is_none(),
        "no history before the first record"
    );

    let first = AnalysisRecord {
        id: "a1".to_string(),
        content: "Chocolate cures all diseases".to_string(),
        result: json!({"verdict": "false"}),
        timestamp: Utc::now(),
        misinformation_types: vec!["health".to_string()],
        confidence: 0.92,
    };
    training.save_analysis_record("u1", &first).await.unwrap();

    let second = AnalysisRecord {
        id: "a2".to_string(),
        content: "The moon is made of cheese".to_string(),
        result: json!({"verdict": "false"}),
        timestamp: Utc::now(),
        misinformation_types: Vec::new(),
        confidence: 0.99,
    };
    training.save_analysis_record("u1", &second).await.unwrap();

    let history = training
        .get_analysis_history("u1")
        .await
        .unwrap()
        .expect("history after records");
    assert_eq!(history.user_id, "u1");
    assert_eq!(history.analyses.len(), 2);
    assert_eq!(history.analyses[0].id, "a1");
    assert_eq!(history.analyses[1].id, "a2");
    assert!(history.verifications.is_empty());
}
