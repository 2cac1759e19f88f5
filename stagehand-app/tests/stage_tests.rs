#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `StageBuilder`, `Stage` and the scene adapters.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stagehand_app::adapters::{JsonFileStore, Scene, SceneNode, TemplateLoader, TickAnimator};
use stagehand_app::{load_config, StageBuilder};
use stagehand_core::config::StageConfig;
use stagehand_core::error::CoreError;
use stagehand_core::services::{SequenceOutcome, ViewController};
use stagehand_core::traits::{ElementKind, NodeAnchor, VisualNode};
use stagehand_core::types::{
    LifecycleState, ModalRequest, ModalResult, Rect, TransitionKind, TutorialEvent, TutorialStep,
};
use tokio::sync::broadcast;

// ===== Helpers =====

struct Fixture {
    scene: Arc<Scene>,
    viewport: Arc<SceneNode>,
    loader: Arc<TemplateLoader>,
}

fn fixture() -> Fixture {
    let scene = Scene::new();
    let viewport = scene.create_with_rect(
        "Viewport",
        ElementKind::Container,
        Rect::new(0.0, 0.0, 80.0, 24.0),
    );
    let loader = Arc::new(TemplateLoader::with_standard_templates(
        Arc::clone(&scene),
        &StageConfig::default(),
    ));
    Fixture {
        scene,
        viewport,
        loader,
    }
}

fn screen(scene: &Scene, name: &str) -> Arc<ViewController> {
    let full = Rect::new(0.0, 0.0, 80.0, 24.0);
    let root = scene.create_with_rect(name, ElementKind::Container, full);
    let play = scene.create_with_rect("Play", ElementKind::Button, Rect::new(30.0, 0.0, 10.0, 1.0));
    root.add_child(&play);
    ViewController::with_root(name, root)
}

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// 等待满足条件的教程事件
async fn wait_for(
    events: &mut broadcast::Receiver<TutorialEvent>,
    wanted: impl Fn(&TutorialEvent) -> bool,
) -> TutorialEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event) if wanted(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for tutorial event")
}

fn click(viewport: &SceneNode, name: &str) {
    let node = viewport
        .find(name)
        .unwrap_or_else(|| panic!("no node named {name}"));
    assert!(node.click(), "{name} did not react");
}

// ===== Builder =====

#[test]
fn test_build_requires_loader_and_viewport() {
    let f = fixture();
    let err = StageBuilder::new()
        .viewport(f.viewport.clone())
        .build()
        .err()
        .expect("loader missing");
    assert!(matches!(err, CoreError::InvalidConfig(_)));

    let err = StageBuilder::new()
        .loader(f.loader.clone())
        .build()
        .err()
        .expect("viewport missing");
    assert!(matches!(err, CoreError::InvalidConfig(_)));
}

#[test]
fn test_build_rejects_invalid_config() {
    let f = fixture();
    let mut config = StageConfig::default();
    config.placement.gap = -3.0;
    let result = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .config(config)
        .build();
    assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
}

// ===== Navigation =====

#[test]
fn test_navigation_with_instant_animator() {
    let f = fixture();
    let stage = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .build()
        .unwrap();

    let home = screen(&f.scene, "Home");
    let gallery = screen(&f.scene, "Gallery");
    let nav = &stage.navigation;
    assert!(nav.push(Arc::clone(&home), TransitionKind::None, Duration::ZERO));
    assert!(nav.push(Arc::clone(&gallery), TransitionKind::SlideLeft, Duration::ZERO));

    assert_eq!(nav.len(), 2);
    assert_eq!(gallery.state(), LifecycleState::Appeared);
    assert_eq!(home.state(), LifecycleState::Disappeared);
    assert!(!home.root().unwrap().is_active());

    let popped = nav.pop(TransitionKind::SlideRight, Duration::ZERO);
    assert_eq!(popped.map(|c| c.name().to_string()), Some("Gallery".to_string()));
    assert_eq!(home.state(), LifecycleState::Appeared);
    assert_eq!(home.root().unwrap().rect().origin(), f.viewport.rect().origin());
    // 占位节点全部销毁
    assert!(f.viewport.find("Placeholder").is_none());
}

#[test]
fn test_interrupted_slide_settles_at_rest_positions() {
    let f = fixture();
    let animator = Arc::new(TickAnimator::new());
    let stage = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .animator(animator.clone())
        .build()
        .unwrap();

    let home = screen(&f.scene, "Home");
    let detail = screen(&f.scene, "Detail");
    let nav = &stage.navigation;
    nav.push(Arc::clone(&home), TransitionKind::None, Duration::ZERO);
    animator.finish_all();
    let rest = home.root().unwrap().rect().origin();

    nav.push(Arc::clone(&detail), TransitionKind::SlideLeft, Duration::ZERO);
    animator.tick(Instant::now() + Duration::from_millis(100));
    // Home 正在滑出，Detail 正在滑入
    assert!(home.root().unwrap().rect().x < rest.x);
    assert!(detail.root().unwrap().rect().x > rest.x);

    // 动画中途返回
    nav.pop(TransitionKind::SlideRight, Duration::ZERO);
    animator.finish_all();

    let home_root = home.root().unwrap();
    assert_eq!(home_root.rect().origin(), rest);
    assert!(home_root.is_active());
    assert_eq!(home.state(), LifecycleState::Appeared);
    let detail_root = detail.root().unwrap();
    assert_eq!(detail_root.rect().origin(), rest);
    assert!(!detail_root.is_active());

    // 再次进入时仍从静止位置开始
    nav.push(Arc::clone(&detail), TransitionKind::SlideLeft, Duration::ZERO);
    animator.finish_all();
    assert_eq!(detail.root().unwrap().rect().origin(), rest);
}

// ===== Modals =====

#[tokio::test]
async fn test_modal_queue_resolves_in_order() {
    let f = fixture();
    let stage = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .build()
        .unwrap();

    let first = stage.show_modal(ModalRequest::new("First", "one"));
    let second = stage.show_modal(ModalRequest::new("Second", "two"));
    settle().await;

    assert_eq!(f.viewport.find("Title").unwrap().text(), "First");
    click(&f.viewport, "ConfirmButton");
    assert_eq!(first.await, ModalResult::Confirmed);

    settle().await;
    assert_eq!(f.viewport.find("Title").unwrap().text(), "Second");
    click(&f.viewport, "CloseButton");
    assert_eq!(second.await, ModalResult::Closed);

    settle().await;
    assert!(stage.modals.is_idle());
    assert!(f.viewport.find("Dialog").is_none());
}

#[tokio::test]
async fn test_near_target_modal_stays_in_viewport() {
    let f = fixture();
    let stage = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .build()
        .unwrap();

    let target = Rect::new(30.0, 0.0, 10.0, 1.0);
    let _handle = stage.show_modal(ModalRequest::new("Tip", "near the top").near(target));
    settle().await;

    let dialog = f.viewport.find("Dialog").unwrap().rect();
    assert!(!dialog.intersects(&target));
    assert!(dialog.top() >= target.bottom());
    assert!(dialog.bottom() <= 24.0);
}

#[tokio::test]
async fn test_sequence_runs_through_stage() {
    let f = fixture();
    let stage = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .build()
        .unwrap();

    let sequence = stage.sequence(vec![
        ModalRequest::new("Step 1", ""),
        ModalRequest::new("Step 2", ""),
    ]);
    let run = tokio::spawn(async move { sequence.run().await });

    settle().await;
    click(&f.viewport, "ConfirmButton");
    settle().await;
    click(&f.viewport, "ConfirmButton");

    assert_eq!(run.await.unwrap(), SequenceOutcome::Completed);
}

// ===== Tutorial =====

fn tutorial_steps() -> Vec<TutorialStep> {
    vec![
        TutorialStep::new("welcome", "play", ModalRequest::new("Welcome", "Press OK")),
        TutorialStep::new("play", "play", ModalRequest::new("Play", "Press Play"))
            .dismiss_on_anchor_action(),
    ]
}

#[tokio::test]
async fn test_tutorial_progress_survives_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let progress_path = tmp.path().join("progress.json");

    {
        let f = fixture();
        let stage = StageBuilder::new()
            .loader(f.loader.clone())
            .viewport(f.viewport.clone())
            .store(Arc::new(JsonFileStore::new(&progress_path)))
            .build()
            .unwrap();
        let home = screen(&f.scene, "Home");
        stage.navigation.push(Arc::clone(&home), TransitionKind::None, Duration::ZERO);
        let play = home.button("Play").unwrap();
        stage.anchors().register("play", NodeAnchor::new(play.clone()));

        let tutorial = stage.tutorial("intro", tutorial_steps());
        let mut events = tutorial.subscribe();
        assert!(tutorial.begin_if_needed().await.unwrap());

        wait_for(&mut events, |e| {
            matches!(e, TutorialEvent::StepShown { step_id } if step_id == "welcome")
        })
        .await;
        settle().await;
        assert!(stage.highlighter.is_visible());
        assert_eq!(f.viewport.find("Title").unwrap().text(), "Welcome");
        click(&f.viewport, "ConfirmButton");

        // 第二步由锚点点击推进
        wait_for(&mut events, |e| {
            matches!(e, TutorialEvent::StepShown { step_id } if step_id == "play")
        })
        .await;
        settle().await;
        assert_eq!(tutorial.current_index(), Some(1));
        let anchor_node = f.viewport.find("Play").unwrap();
        assert_eq!(anchor_node.id(), play.id());
        // 弹窗在覆盖层导航栈上，主栈的按钮仍可点击
        assert!(anchor_node.click());

        let ended = wait_for(&mut events, |e| matches!(e, TutorialEvent::Ended { .. })).await;
        assert_eq!(ended, TutorialEvent::Ended { completed: true });
        assert!(!tutorial.is_running());
        assert!(!stage.highlighter.is_visible());
    }

    let f = fixture();
    let stage = StageBuilder::new()
        .loader(f.loader.clone())
        .viewport(f.viewport.clone())
        .store(Arc::new(JsonFileStore::new(&progress_path)))
        .build()
        .unwrap();
    let tutorial = stage.tutorial("intro", tutorial_steps());
    assert!(!tutorial.begin_if_needed().await.unwrap());
    assert!(stage.progress.is_step_done("intro", "welcome").await.unwrap());
}

// ===== Config =====

#[test]
fn test_load_config_missing_file_uses_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let config = load_config(&tmp.path().join("stagehand.json")).unwrap();
    assert_eq!(config, StageConfig::default());
}

#[test]
fn test_load_config_partial_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("stagehand.json");
    std::fs::write(
        &path,
        r#"{"modal":{"show_transition":"fade"},"tutorial":{"highlight_padding":2}}"#,
    )
    .unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.modal.show_transition, TransitionKind::Fade);
    assert!((config.tutorial.highlight_padding - 2.0).abs() < f32::EPSILON);
    assert_eq!(config.modal.dialog_template, "dialog");
}

#[test]
fn test_load_config_invalid_file_is_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("stagehand.json");
    std::fs::write(&path, "[1, 2").unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, CoreError::SerializationError(_)));
}
