use chirp::models::{NewMessage, NewNotification, NewPost, NewUser, NotificationKind};
use chirp::store::{MemoryStore, Storage};

async fn user(store: &MemoryStore, username: &str) -> String {
    store
        .create_user(NewUser {
            username: username.to_string(),
            name: username.to_string(),
            email: None,
            avatar: None,
            bio: None,
            location: None,
            website: None,
            verified: false,
        })
        .await
        .unwrap()
        .id
}

async fn post(store: &MemoryStore, author_id: &str, content: &str) -> String {
    store
        .create_post(NewPost {
            author_id: author_id.to_string(),
            content: content.to_string(),
            parent_post_id: None,
            images: None,
            video: None,
            gif: None,
            poll: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn like_toggle_is_idempotent_on_pairs() {
    let store = MemoryStore::new();
    let author = user(&store, "author").await;
    let fan = user(&store, "fan").await;
    let post_id = post(&store, &author, "hello").await;

    assert!(store.toggle_like(&fan, &post_id).await.unwrap());
    assert!(store.is_liked(&fan, &post_id).await.unwrap());
    assert_eq!(store.get_post(&post_id).await.unwrap().post.likes, 1);

    assert!(!store.toggle_like(&fan, &post_id).await.unwrap());
    assert!(!store.is_liked(&fan, &post_id).await.unwrap());
    assert_eq!(store.get_post(&post_id).await.unwrap().post.likes, 0);
}

#[tokio::test]
async fn like_counter_tracks_edge_cardinality() {
    let store = MemoryStore::new();
    let author = user(&store, "author").await;
    let post_id = post(&store, &author, "hello").await;

    let mut fans = Vec::new();
    for i in 0..5 {
        fans.push(user(&store, &format!("fan{}", i)).await);
    }

    for fan in &fans {
        store.toggle_like(fan, &post_id).await.unwrap();
    }
    // Two fans change their mind, one of them twice.
    store.toggle_like(&fans[0], &post_id).await.unwrap();
    store.toggle_like(&fans[1], &post_id).await.unwrap();
    store.toggle_like(&fans[1], &post_id).await.unwrap();

    let liked_count = {
        let mut n = 0;
        for fan in &fans {
            if store.is_liked(fan, &post_id).await.unwrap() {
                n += 1;
            }
        }
        n
    };
    assert_eq!(liked_count, 4);
    assert_eq!(
        store.get_post(&post_id).await.unwrap().post.likes,
        liked_count
    );
}

#[tokio::test]
async fn follow_is_asymmetric_and_counters_round_trip() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    let b = user(&store, "b").await;

    assert!(store.toggle_follow(&b, &a).await.unwrap());
    assert!(store.is_following(&b, &a).await.unwrap());
    assert!(!store.is_following(&a, &b).await.unwrap());
    assert_eq!(store.get_user(&a).await.unwrap().followers, 1);
    assert_eq!(store.get_user(&b).await.unwrap().following, 1);

    assert!(!store.toggle_follow(&b, &a).await.unwrap());
    assert_eq!(store.get_user(&a).await.unwrap().followers, 0);
    assert_eq!(store.get_user(&b).await.unwrap().following, 0);
}

#[tokio::test]
async fn follow_emits_a_notification_once() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    let b = user(&store, "b").await;

    store.toggle_follow(&b, &a).await.unwrap();
    store.toggle_follow(&b, &a).await.unwrap();
    store.toggle_follow(&b, &a).await.unwrap();

    // Two follow halves, no notification for the unfollow.
    assert_eq!(store.unread_count(&a).await.unwrap(), 2);
    let first = &store.list_notifications(&a, 50).await.unwrap()[0];
    assert_eq!(first.from_user.as_ref().unwrap().id, b);
}

#[tokio::test]
async fn conversation_lookup_matches_unordered_sets() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    let b = user(&store, "b").await;
    let c = user(&store, "c").await;

    let first = store
        .get_or_create_conversation(&[a.clone(), b.clone()])
        .await
        .unwrap();
    let second = store
        .get_or_create_conversation(&[b.clone(), a.clone()])
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let trio = store
        .get_or_create_conversation(&[a.clone(), b.clone(), c.clone()])
        .await
        .unwrap();
    assert_ne!(first.id, trio.id);

    assert!(store.get_or_create_conversation(&[a.clone()]).await.is_err());
}

#[tokio::test]
async fn messages_unread_until_recipient_marks_read() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    let b = user(&store, "b").await;

    let conversation = store
        .get_or_create_conversation(&[a.clone(), b.clone()])
        .await
        .unwrap();
    store
        .send_message(NewMessage {
            conversation_id: conversation.id.clone(),
            sender_id: a.clone(),
            content: "hi".to_string(),
            images: None,
        })
        .await
        .unwrap();

    let inbox = store.list_conversations(&b).await.unwrap();
    assert_eq!(inbox.len(), 1);
    let last = inbox[0].last_message.as_ref().unwrap();
    assert_eq!(last.message.content, "hi");
    assert!(!last.message.read);

    assert!(store.mark_messages_read(&conversation.id, &b).await.unwrap());
    let messages = store.list_messages(&conversation.id, 50).await.unwrap();
    assert!(messages[0].message.read);

    // Nothing left to mark.
    assert!(!store.mark_messages_read(&conversation.id, &b).await.unwrap());
}

#[tokio::test]
async fn sender_messages_are_not_marked_by_own_read() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    let b = user(&store, "b").await;

    let conversation = store
        .get_or_create_conversation(&[a.clone(), b.clone()])
        .await
        .unwrap();
    store
        .send_message(NewMessage {
            conversation_id: conversation.id.clone(),
            sender_id: a.clone(),
            content: "hi".to_string(),
            images: None,
        })
        .await
        .unwrap();

    // The sender marking the conversation read changes nothing.
    assert!(!store.mark_messages_read(&conversation.id, &a).await.unwrap());
}

#[tokio::test]
async fn hashtags_aggregate_across_posts() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    let b = user(&store, "b").await;

    post(&store, &a, "launch day #Foo").await;
    post(&store, &b, "still about #foo").await;

    // Search is the observable surface; both posts match the tag text.
    let found = store.search_posts("#foo", 50).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn notifications_mark_all_read() {
    let store = MemoryStore::new();
    let author = user(&store, "author").await;
    let fan = user(&store, "fan").await;
    let post_id = post(&store, &author, "hello").await;

    store.toggle_like(&fan, &post_id).await.unwrap();
    store.toggle_retweet(&fan, &post_id, None).await.unwrap();
    assert_eq!(store.unread_count(&author).await.unwrap(), 2);

    assert!(store.mark_all_notifications_read(&author).await.unwrap());
    assert_eq!(store.unread_count(&author).await.unwrap(), 0);
    assert!(!store.mark_all_notifications_read(&author).await.unwrap());
}

#[tokio::test]
async fn direct_notification_create_and_mark_read() {
    let store = MemoryStore::new();
    let recipient = user(&store, "recipient").await;
    let actor = user(&store, "actor").await;

    let notification = store
        .create_notification(NewNotification {
            user_id: recipient.clone(),
            from_user_id: Some(actor.clone()),
            kind: NotificationKind::Mention,
            entity_id: None,
        })
        .await
        .unwrap();
    assert!(!notification.read);
    assert_eq!(store.unread_count(&recipient).await.unwrap(), 1);

    assert!(store.mark_notification_read(&notification.id).await.unwrap());
    assert_eq!(store.unread_count(&recipient).await.unwrap(), 0);
    assert!(!store.mark_notification_read("missing").await.unwrap());

    // Unknown recipients are rejected.
    assert!(store
        .create_notification(NewNotification {
            user_id: "missing".to_string(),
            from_user_id: None,
            kind: NotificationKind::Like,
            entity_id: None,
        })
        .await
        .is_err());
}

#[tokio::test]
async fn user_likes_lists_most_recent_action_first() {
    let store = MemoryStore::new();
    let author = user(&store, "author").await;
    let fan = user(&store, "fan").await;
    let first = post(&store, &author, "first").await;
    let second = post(&store, &author, "second").await;

    store.toggle_like(&fan, &first).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    store.toggle_like(&fan, &second).await.unwrap();

    let likes = store.user_likes(&fan).await.unwrap();
    assert_eq!(likes[0].post.id, second);
    assert_eq!(likes[1].post.id, first);
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let store = MemoryStore::new();
    user(&store, "taken").await;
    let result = store
        .create_user(NewUser {
            username: "taken".to_string(),
            name: "Someone Else".to_string(),
            email: None,
            avatar: None,
            bio: None,
            location: None,
            website: None,
            verified: false,
        })
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn username_lookup() {
    let store = MemoryStore::new();
    let id = user(&store, "ada").await;
    assert_eq!(store.get_user_by_username("ada").await.unwrap().id, id);
    assert!(store.get_user_by_username("missing").await.is_err());
}

#[tokio::test]
async fn post_creation_bumps_author_tweet_count() {
    let store = MemoryStore::new();
    let a = user(&store, "a").await;
    post(&store, &a, "one").await;
    post(&store, &a, "two").await;
    assert_eq!(store.get_user(&a).await.unwrap().tweets_count, 2);
}
