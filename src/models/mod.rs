// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod engagement;
pub mod message;
pub mod notification;
pub mod post;
pub mod trending;
pub mod user;

pub use engagement::{Bookmark, Follow, Like, Retweet};
pub use message::{
    Conversation, ConversationParticipant, ConversationView, DirectMessage, MessageView,
    NewMessage, ParticipantView,
};
pub use notification::{NewNotification, Notification, NotificationKind, NotificationView};
pub use post::{NewPost, Post, PostView};
pub use trending::{Hashtag, PostHashtag, TrendingTopic};
pub use user::{NewUser, User, UserUpdate};
