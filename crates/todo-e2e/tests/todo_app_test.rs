// Todo app scenarios
//
// End-to-end checks of the create, edit, complete, delete and filter
// workflows through the page objects. Each test gets its own browser session.
//
// Run against a deployed app with BASE_URL=<url>; without it the scenarios
// use the local fixture app from test_server.rs.


use std::time::Instant;
use test_server::TargetApp;
use todo_e2e::pages::locators::add_task::NAME_TOO_LONG_MESSAGE;
use todo_e2e::{Error, Result, harness};

#[tokio::test]
async fn test_add_task() -> Result<()> {
    for task in ["Buy milk", "Do laundry"] {
        let app = TargetApp::start().await;
        let name = format!("add_task-{task}");

        harness::run(&app.config, &name, |ctx| async move {
            ctx.wait_for_app_ready().await?;
            ctx.step(format!("Add task: {task}"), ctx.todo_list.add_task(task))
                .await?;

            let tasks = ctx
                .step("Verify task is added", ctx.todo_list.get_tasks())
                .await?;
            tracing::info!("Tasks after add: {tasks:?}");
            assert!(tasks.iter().any(|t| t == task), "{task} missing from {tasks:?}");
            Ok(())
        })
        .await?;

        app.shutdown();
    }
    Ok(())
}

#[tokio::test]
async fn test_add_task_adds_exactly_one_entry() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "add_task_adds_exactly_one_entry", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        let occurrences = |tasks: &[String]| tasks.iter().filter(|t| *t == "Buy milk").count();

        ctx.todo_list.add_task("Buy milk").await?;
        let before = ctx.todo_list.get_tasks().await?;
        ctx.todo_list.add_task("Buy milk").await?;
        let after = ctx.todo_list.get_tasks().await?;

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(occurrences(&after), occurrences(&before) + 1);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_add_empty_task() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "add_empty_task", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.step("Navigate to /add and submit empty task", async {
            let form = ctx.todo_list.open_add_task_screen().await?;
            form.submit_empty_task().await
        })
        .await?;

        ctx.add_task.navigate_to_main_tasks().await?;
        let tasks = ctx.todo_list.get_tasks().await?;
        tracing::info!("Tasks after empty submission: {tasks:?}");
        assert!(tasks.is_empty(), "Empty submission created {tasks:?}");
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_add_task_with_long_name() -> Result<()> {
    let app = TargetApp::start().await;
    let long_task_name =
        "This is a very long task name that exceeds the 40 character limit for validation testing";

    harness::run(&app.config, "add_task_with_long_name", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.open_add_task_screen().await?;
        ctx.add_task.fill_task_name_only(long_task_name).await?;

        let error_message = ctx.add_task.get_validation_error_message().await?;
        tracing::info!("Validation error message: {error_message}");
        assert_eq!(error_message, NAME_TOO_LONG_MESSAGE);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_add_multiple_tasks() -> Result<()> {
    let app = TargetApp::start().await;
    let multiple_tasks = [
        "Task 1: Buy groceries",
        "Task 2: Call dentist",
        "Task 3: Review project documents",
        "Task 4: Schedule team meeting",
        "Task 5: Update software licenses",
    ];

    harness::run(&app.config, "add_multiple_tasks", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        for (i, task) in multiple_tasks.iter().enumerate() {
            ctx.step(format!("Adding task {}: {task}", i + 1), async {
                ctx.todo_list.add_task(task).await?;
                ctx.todo_list.wait_for_add_task_button().await
            })
            .await?;
        }

        let tasks = ctx.todo_list.get_tasks().await?;
        tracing::info!(
            "Expected tasks count: {}, Actual tasks count: {}",
            multiple_tasks.len(),
            tasks.len()
        );
        assert_eq!(tasks.len(), multiple_tasks.len());
        let positions: Vec<usize> = multiple_tasks
            .iter()
            .map(|expected| {
                tasks
                    .iter()
                    .position(|t| t.contains(expected))
                    .unwrap_or_else(|| panic!("Task '{expected}' not found in tasks list: {tasks:?}"))
            })
            .collect();
        // Rows render in insertion order
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "Tasks out of insertion order: {tasks:?}"
        );
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_mark_task_complete() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "mark_task_complete", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.add_task("Complete me").await?;
        ctx.todo_list.mark_complete(0).await?;

        assert_eq!(ctx.todo_list.count_completed_tasks().await?, 1);
        assert_eq!(ctx.todo_list.filter_completed_from_title().await?, 1);
        let tasks = ctx.todo_list.get_tasks().await?;
        assert_eq!(tasks, vec!["Complete me".to_string()]);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_edit_task() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "edit_task", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.add_task("Old task").await?;
        ctx.todo_list.edit_task(0, "New task").await?;

        let tasks = ctx.todo_list.get_tasks().await?;
        tracing::info!("Edited task name: {tasks:?}");
        assert!(tasks.iter().any(|t| t.contains("New task")), "Task was not edited");
        assert!(!tasks.iter().any(|t| t == "Old task"));
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_delete_task() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "delete_task", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.add_task("Remove me").await?;
        ctx.todo_list.delete_task(0).await?;

        let tasks = ctx.todo_list.get_tasks().await?;
        tracing::info!("Tasks after delete: {tasks:?}");
        assert!(tasks.is_empty(), "Task was not deleted");
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_filter_completed() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "filter_completed", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.step("Add multiple tasks", async {
            ctx.todo_list.add_task("One").await?;
            ctx.todo_list.add_task("Two").await
        })
        .await?;
        ctx.todo_list.mark_complete(1).await?;

        let in_title = ctx.todo_list.filter_completed_from_title().await?;
        let on_board = ctx.todo_list.count_completed_tasks().await?;
        tracing::info!("Completed in title: {in_title}, on board: {on_board}");
        assert_eq!(in_title as usize, on_board, "task was not marked as completed");
        assert_eq!(on_board, 1);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_performance_with_many_tasks() -> Result<()> {
    let app = TargetApp::start().await;
    let many_tasks: Vec<String> = (1..=30).map(|i| format!("Task {i}")).collect();

    harness::run(&app.config, "performance_with_many_tasks", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.step("Add 30 tasks", async {
            for task in &many_tasks {
                ctx.todo_list.add_task(task).await?;
                ctx.todo_list.wait_for_add_task_button().await?;
            }
            Ok(())
        })
        .await?;

        let all_tasks = ctx.todo_list.get_tasks().await?;
        assert_eq!(all_tasks.len(), 30, "Expected 30 tasks, got {}", all_tasks.len());

        let start = Instant::now();
        let visible = ctx.todo_list.get_number_of_visible_tasks().await?;
        let elapsed = start.elapsed();
        tracing::info!("Counted {visible} visible tasks in {:.2} seconds", elapsed.as_secs_f64());
        assert!(visible > 0 && elapsed.as_secs_f64() < 3.0, "UI response too slow with many tasks");
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_page_load_performance() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "page_load_performance", |ctx| async move {
        let load_time = ctx.page_load_time_ms().await?;
        assert!(load_time >= 0.0);
        assert!(load_time < 5000.0, "Page load took too long: {load_time} ms");
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_get_tasks_is_idempotent() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "get_tasks_is_idempotent", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.add_task("Stable").await?;

        let first = ctx.todo_list.get_tasks().await?;
        let second = ctx.todo_list.get_tasks().await?;
        assert_eq!(first, second);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_empty_list_has_no_visible_tasks() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "empty_list_has_no_visible_tasks", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        assert_eq!(ctx.todo_list.get_number_of_visible_tasks().await?, 0);
        assert_eq!(ctx.todo_list.count_completed_tasks().await?, 0);
        assert!(ctx.todo_list.get_tasks().await?.is_empty());
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_title_addressed_operations() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "title_addressed_operations", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        for task in ["Alpha", "Beta", "Gamma"] {
            ctx.todo_list.add_task(task).await?;
        }

        ctx.todo_list.delete_task("Beta").await?;
        assert_eq!(ctx.todo_list.get_tasks().await?, vec!["Alpha", "Gamma"]);
        assert_eq!(ctx.todo_list.position_of("Gamma").await?, Some(1));

        ctx.todo_list.mark_complete("Gamma").await?;
        assert_eq!(ctx.todo_list.count_completed_tasks().await?, 1);

        ctx.todo_list.edit_task("Alpha", "Omega").await?;
        assert_eq!(ctx.todo_list.position_of("Omega").await?, Some(0));
        assert_eq!(ctx.todo_list.position_of("Alpha").await?, None);

        let err = ctx.todo_list.delete_task("Missing task").await.unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(ref title) if title == "Missing task"));
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_index_past_the_end_is_rejected() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "index_past_the_end_is_rejected", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.add_task("Only").await?;

        let err = ctx.todo_list.mark_complete(3).await.unwrap_err();
        match err {
            Error::IndexOutOfRange { what, index, len } => {
                assert_eq!((what, index, len), ("task", 3, 1));
            }
            other => panic!("expected IndexOutOfRange, got {other}"),
        }
        assert_eq!(ctx.todo_list.count_completed_tasks().await?, 0);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_search_narrows_rendered_tasks() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "search_narrows_rendered_tasks", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        for task in ["Buy milk", "Buy bread", "Walk dog"] {
            ctx.todo_list.add_task(task).await?;
        }

        ctx.todo_list.search("buy").await?;
        assert_eq!(ctx.todo_list.get_tasks().await?, vec!["Buy milk", "Buy bread"]);

        // Positions follow what is rendered, not the stored order
        ctx.todo_list.delete_task(1).await?;
        ctx.todo_list.search("").await?;
        assert_eq!(ctx.todo_list.get_tasks().await?, vec!["Buy milk", "Walk dog"]);
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_each_task_shows_a_timestamp() -> Result<()> {
    let app = TargetApp::start().await;

    harness::run(&app.config, "each_task_shows_a_timestamp", |ctx| async move {
        ctx.wait_for_app_ready().await?;
        ctx.todo_list.add_task("First").await?;
        ctx.todo_list.add_task("Second").await?;

        let timestamps = ctx.todo_list.get_timestamps().await?;
        assert_eq!(timestamps.len(), 2);
        assert!(timestamps.iter().all(|t| !t.trim().is_empty()));
        Ok(())
    })
    .await?;

    app.shutdown();
    Ok(())
}
