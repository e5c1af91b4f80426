//! rustbb/crates/integration-tests/tests/listing.rs
//!
//! The listing engine over real sqlite: plain pagination, search windows and
//! their navigation anchors, notice handling, and comment decoration.

use domains::{Actor, SearchField, SearchFilter};
use integration_tests::TestBbs;
use services::ListRequest;

fn search(text: &str) -> ListRequest {
    ListRequest {
        search: Some(SearchFilter {
            field: SearchField::SubjectContent,
            text: text.into(),
        }),
        page: 1,
        ..ListRequest::default()
    }
}

#[tokio::test]
async fn plain_listing_paginates_newest_first_with_ordinals() {
    let bbs = TestBbs::new().await;
    bbs.add_board("free").await;
    for id in 1..=5 {
        bbs.add_post("free", id, Some("alice")).await;
    }

    let req = ListRequest {
        page: 2,
        per_page: Some(2),
        ..ListRequest::default()
    };
    let page = bbs
        .listing
        .list_posts("free", &req, &Actor::guest())
        .await
        .unwrap();

    assert_eq!(page.total_count, 5);
    let ids: Vec<i64> = page.posts.iter().map(|p| p.write.id).collect();
    assert_eq!(ids, vec![3, 2]);
    let ordinals: Vec<i64> = page.posts.iter().map(|p| p.ordinal).collect();
    assert_eq!(ordinals, vec![3, 2]);
    assert_eq!(page.prev_window_start, None);
    assert_eq!(page.next_window_start, None);
}

#[tokio::test]
async fn notices_are_excluded_unless_requested() {
    let bbs = TestBbs::new().await;
    bbs.add_board("free").await;
    bbs.set_notices("free", "2").await;
    for id in 1..=3 {
        bbs.add_post("free", id, None).await;
    }

    let page = bbs
        .listing
        .list_posts("free", &ListRequest::default(), &Actor::guest())
        .await
        .unwrap();
    let ids: Vec<i64> = page.posts.iter().map(|p| p.write.id).collect();
    assert_eq!(ids, vec![3, 1]);

    let req = ListRequest {
        include_notices: true,
        ..ListRequest::default()
    };
    let page = bbs
        .listing
        .list_posts("free", &req, &Actor::guest())
        .await
        .unwrap();
    assert_eq!(page.posts.len(), 3);

    let notices = bbs
        .listing
        .get_notice_posts("free", &Actor::guest(), false)
        .await
        .unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].write.id, 2);
}

#[tokio::test]
async fn search_folds_comment_hits_into_their_parent() {
    let bbs = TestBbs::new().await;
    bbs.add_board("free").await;
    bbs.add_post("free", 1, None).await;
    bbs.add_post("free", 2, None).await;
    bbs.add_comment("free", 3, 2, "AA", Some("bob")).await;
    sqlx::query("UPDATE writes SET content = 'the needle is in here' WHERE id = 3")
        .execute(&bbs.pool)
        .await
        .unwrap();

    let page = bbs
        .listing
        .list_posts("free", &search("needle"), &Actor::guest())
        .await
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.posts[0].write.id, 2);
    assert!(!page.posts[0].write.is_comment);
    // The matching comment rides along, decorated.
    assert_eq!(page.posts[0].comments.len(), 1);
    assert_eq!(page.posts[0].comments[0].id, 3);
}

#[tokio::test]
async fn window_anchors_walk_the_partition() {
    let bbs = TestBbs::new().await;
    bbs.add_board("free").await;
    for id in [1_i64, 2, 3, 15_000] {
        bbs.add_post("free", id, None).await;
    }

    // First window starts at the partition minimum (-15000): only the one
    // deep post matches, and the next anchor moves toward zero.
    let page = bbs
        .listing
        .list_posts("free", &search("post"), &Actor::guest())
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.posts[0].write.id, 15_000);
    assert_eq!(page.prev_window_start, None);
    assert_eq!(page.next_window_start, Some(-5_000));

    // Following the anchor lands on the shallow posts; walking back is now
    // possible, walking forward would cross zero.
    let req = ListRequest {
        window_start: Some(-5_000),
        ..search("post")
    };
    let page = bbs
        .listing
        .list_posts("free", &req, &Actor::guest())
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);
    assert_eq!(page.prev_window_start, Some(-15_000));
    assert_eq!(page.next_window_start, None);
}

#[tokio::test]
async fn secret_comments_redact_for_strangers_only() {
    let bbs = TestBbs::new().await;
    bbs.add_board("free").await;
    bbs.add_post("free", 1, Some("alice")).await;
    bbs.add_comment("free", 2, 1, "AA", Some("bob")).await;
    bbs.set_options("free", 2, "secret").await;

    let page = bbs
        .listing
        .list_posts("free", &ListRequest::default(), &Actor::guest())
        .await
        .unwrap();
    let comment = &page.posts[0].comments[0];
    assert!(comment.is_secret);
    assert!(comment.is_secret_content);
    assert_eq!(comment.content, "This is a secret comment.");
    assert_eq!(comment.display_ip, "10.*.*.3");

    // The comment author, the post author, and admins all see through it.
    for actor in [
        Actor::member("bob", 1),
        Actor::member("alice", 1),
        Actor::super_admin("root"),
    ] {
        let page = bbs
            .listing
            .list_posts("free", &ListRequest::default(), &actor)
            .await
            .unwrap();
        assert!(!page.posts[0].comments[0].is_secret_content);
        assert_eq!(page.posts[0].comments[0].content, "comment 2");
    }

    let page = bbs
        .listing
        .list_posts("free", &ListRequest::default(), &Actor::super_admin("root"))
        .await
        .unwrap();
    assert_eq!(page.posts[0].comments[0].display_ip, "10.1.2.3");
}

#[tokio::test]
async fn file_summaries_are_attached_on_request() {
    let bbs = TestBbs::new().await;
    bbs.add_board("free").await;
    bbs.add_post("free", 1, None).await;
    bbs.add_file("free", 1, 0, "shot.png").await;
    bbs.add_file("free", 1, 1, "notes.txt").await;

    let page = bbs
        .listing
        .list_posts("free", &ListRequest::default(), &Actor::guest())
        .await
        .unwrap();
    // The thumbnail is derived even when summaries are not requested.
    assert!(page.posts[0].thumbnail.is_some());
    assert!(page.posts[0].images.is_empty());
    assert!(page.posts[0].files.is_empty());

    let req = ListRequest {
        with_files: true,
        ..ListRequest::default()
    };
    let page = bbs
        .listing
        .list_posts("free", &req, &Actor::guest())
        .await
        .unwrap();
    assert_eq!(page.posts[0].images.len(), 1);
    assert_eq!(page.posts[0].files.len(), 1);
}
