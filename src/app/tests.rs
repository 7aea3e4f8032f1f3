use super::*;
use crate::camera::CameraBehavior;
use crate::config::IntakeConfig;
use crate::events::IntakeEvent;
use crate::signature::{Point, SurfaceRect};
use crate::wizard::{FieldKey, Step};
use std::io::Write;
use tempfile::NamedTempFile;

fn create_runner() -> SessionRunner {
    let mut config = IntakeConfig::default();
    config.camera.resolution = (80, 60);
    SessionRunner::new(config)
}

#[tokio::test]
async fn test_demo_script_completes() {
    let runner = create_runner();
    let mut receiver = runner.event_bus().subscribe();

    let report = runner.run(&SessionScript::demo()).await.unwrap();

    let SessionReport::Completed { message, submission } = report else {
        panic!("Expected completion, got {:?}", report);
    };
    assert_eq!(message, "Success! Your information has been submitted.");
    assert_eq!(submission.fields[&FieldKey::FullName], "Jane Doe");
    assert_eq!((submission.photo.width(), submission.photo.height()), (80, 60));
    assert_eq!(
        (submission.signature.width(), submission.signature.height()),
        (600, 200)
    );

    let mut completed = false;
    while let Ok(event) = receiver.try_recv() {
        if let IntakeEvent::Completed { submission_id, .. } = event {
            assert_eq!(submission_id, submission.id);
            completed = true;
        }
    }
    assert!(completed);
}

#[tokio::test]
async fn test_blank_field_stops_on_first_step() {
    let mut script = SessionScript::demo();
    script.fields.remove("address");
    script.fields.insert("dob".to_string(), "  ".to_string());

    let report = create_runner().run(&script).await.unwrap();

    let SessionReport::Blocked { step, errors, .. } = report else {
        panic!("Expected a block, got {:?}", report);
    };
    assert_eq!(step, Step::PersonalInfo);
    assert_eq!(
        errors.keys().copied().collect::<Vec<_>>(),
        vec![FieldKey::Dob, FieldKey::Address]
    );
    assert_eq!(errors[&FieldKey::Address], "Address is required");
}

#[tokio::test]
async fn test_missing_signature_reports_warning() {
    let mut script = SessionScript::demo();
    script.strokes.clear();

    let report = create_runner().run(&script).await.unwrap();

    let SessionReport::Blocked { step, warning, .. } = report else {
        panic!("Expected a block, got {:?}", report);
    };
    assert_eq!(step, Step::Signature);
    assert_eq!(
        warning.as_deref(),
        Some("Please provide your digital signature before continuing.")
    );
}

#[tokio::test]
async fn test_camera_failures_block_photo_step() {
    for (behavior, text) in [
        (CameraBehavior::Unavailable, "Camera not available. Cannot continue."),
        (CameraBehavior::Deny, "Camera access was denied"),
    ] {
        let mut script = SessionScript::demo();
        script.camera = behavior;

        let report = create_runner().run(&script).await.unwrap();

        let SessionReport::Blocked { step, warning, .. } = report else {
            panic!("Expected a block for {:?}", behavior);
        };
        assert_eq!(step, Step::Photo);
        assert!(
            warning.as_deref().is_some_and(|w| w.contains(text)),
            "unexpected warning {:?} for {:?}",
            warning,
            behavior
        );
    }
}

#[tokio::test]
async fn test_skipped_photo_blocks_completion() {
    let mut script = SessionScript::demo();
    script.take_photo = false;

    let report = create_runner().run(&script).await.unwrap();

    assert!(!report.is_completed());
    let SessionReport::Blocked { warning, .. } = report else {
        unreachable!();
    };
    assert_eq!(
        warning.as_deref(),
        Some("Please take a picture before continuing.")
    );
}

#[tokio::test]
async fn test_stroke_bounds_are_honoured() {
    let mut script = SessionScript::demo();
    // Displayed at half size, offset from the origin
    script.strokes = vec![ScriptStroke {
        points: vec![Point::new(110.0, 60.0), Point::new(390.0, 60.0)],
        bounds: Some(SurfaceRect::new(100.0, 50.0, 300.0, 100.0)),
    }];

    let report = create_runner().run(&script).await.unwrap();

    let SessionReport::Completed { submission, .. } = report else {
        panic!("Expected completion, got {:?}", report);
    };
    let pixels = submission.signature.decode().unwrap();
    assert!(pixels.get_pixel(300, 20)[3] > 0);
    assert_eq!(pixels.get_pixel(300, 150)[3], 0);
}

#[test]
fn test_unknown_field_is_rejected() {
    let mut script = SessionScript::demo();
    script.fields.insert("shoeSize".to_string(), "42".to_string());

    assert!(script.field_values().is_err());
}

#[test]
fn test_load_script_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
camera = "deny"
take_photo = false

[fields]
fullName = "Taro Yamada"
govID = "X1"

[[strokes]]
points = [{{ x = 1.0, y = 2.0 }}, {{ x = 30.0, y = 40.0 }}]
bounds = {{ left = 0.0, top = 0.0, width = 300.0, height = 100.0 }}
"#
    )
    .unwrap();

    let script = SessionScript::load(file.path()).unwrap();

    assert_eq!(script.camera, CameraBehavior::Deny);
    assert!(!script.take_photo);
    assert_eq!(script.render_size, (640, 480));
    assert_eq!(script.strokes[0].points.len(), 2);
    assert_eq!(script.strokes[0].bounds.unwrap().width, 300.0);

    let values = script.field_values().unwrap();
    assert_eq!(
        values,
        vec![
            (FieldKey::FullName, "Taro Yamada".to_string()),
            (FieldKey::GovId, "X1".to_string()),
        ]
    );
}

#[test]
fn test_load_script_rejects_bad_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "camera = \"sometimes\"").unwrap();

    assert!(SessionScript::load(file.path()).is_err());
}
