//! CLI commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use skillswap_api::client::posts::DEFAULT_SEARCH_LIMIT;
use skillswap_api::theme::{load_theme, toggle_theme};
use skillswap_api::types::{
    Id, LoginRequest, NewPost, NewSkill, OutgoingMessage, Page, ProfileUpdate, SignupRequest,
};
use skillswap_api::{ApiClient, Theme};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        full_name: String,

        #[arg(long, env = "SKILLSWAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SKILLSWAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user's profile
    Whoami,

    /// List every user
    Users,

    /// Profile operations
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Feed, post and comment operations
    Posts {
        #[command(subcommand)]
        command: PostCommands,
    },

    /// Notification operations
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Direct messages
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Skill operations
    Skills {
        #[command(subcommand)]
        command: SkillCommands,
    },

    /// Friendship operations
    Friends {
        #[command(subcommand)]
        command: FriendCommands,
    },

    /// Light/dark preference
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show a user's profile (defaults to the signed-in user)
    Show { user_id: Option<String> },

    /// Update profile fields
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Set the profile picture to an already-hosted image
    Avatar { url: String },

    /// Set the cover image to an already-hosted image
    Cover { url: String },
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Show the feed
    Feed,

    /// Posts by one user
    User { user_id: String },

    /// Publish a post
    Create {
        content: String,

        #[arg(long)]
        image_url: Option<String>,
    },

    Like { post_id: String },

    Unlike { post_id: String },

    /// Comment on a post
    Comment { post_id: String, content: String },

    /// List a post's comments
    Comments { post_id: String },

    /// Reply to a comment
    Reply { comment_id: String, content: String },

    Share { post_id: String },

    /// Record that a post was viewed
    View { post_id: String },

    Delete { post_id: String },

    DeleteComment { comment_id: String },

    /// Search posts
    Search {
        query: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
}

#[derive(Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 20)]
    limit: u32,

    #[arg(long, default_value_t = 0)]
    offset: u32,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Self {
            limit: args.limit,
            offset: args.offset,
        }
    }
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Number of unread notifications
    Unread,

    /// Mark one notification as read
    Read { notification_id: String },

    /// Mark every notification as read
    ReadAll,

    Delete { notification_id: String },
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Send a direct message
    Send { to_user_id: String, content: String },

    /// Message history with one user
    History { user_id: String },

    /// Everyone you have chatted with
    Conversations,

    /// Mark messages from a user as read
    Read { user_id: String },

    /// Print incoming messages as they arrive
    Watch,
}

#[derive(Subcommand)]
pub enum SkillCommands {
    /// Your skills
    Mine,

    /// A user's skills
    User { user_id: String },

    Add {
        name: String,

        /// e.g. "teach" or "learn"
        #[arg(long = "type")]
        skill_type: String,
    },

    Update {
        skill_id: String,

        name: String,

        #[arg(long = "type")]
        skill_type: String,
    },

    Remove { skill_id: String },
}

#[derive(Subcommand)]
pub enum FriendCommands {
    /// Accepted friends (`--all` shows pending connections too)
    List {
        #[arg(long)]
        all: bool,
    },

    /// Send a friend request
    Request { user_id: String },

    /// Requests waiting for your answer
    Incoming,

    /// Requests you have sent
    Outgoing,

    Accept { user_id: String },

    Reject { user_id: String },

    /// Remove a friend
    Remove { user_id: String },

    /// People you may know
    Suggestions {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Relationship with one user
    Status { user_id: String },
}

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Show the stored preference
    Show,

    /// Switch between light and dark
    Toggle,

    /// Store a specific preference
    Set { theme: Theme },
}

impl Commands {
    /// Commands that keep running until interrupted
    pub fn is_long_running(&self) -> bool {
        matches!(
            self,
            Self::Chat {
                command: ChatCommands::Watch
            }
        )
    }

    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Signup {
                username,
                email,
                full_name,
                password,
            } => {
                let request = SignupRequest {
                    username,
                    email,
                    password,
                    full_name,
                };
                let response = client.signup(&request).await?;
                if response.session.is_none() {
                    warn!("Account created but no session was returned; log in to continue");
                }
                print_json(&response.user)
            }
            Self::Login { email, password } => {
                let response = client.login(&LoginRequest { email, password }).await?;
                if response.session.is_none() {
                    bail!("Login succeeded but the backend returned no session");
                }
                info!("Logged in");
                print_json(&response.user)
            }
            Self::Logout => {
                client.logout().await?;
                println!("Logged out");
                Ok(())
            }
            Self::Whoami => print_json(&client.me().await?),
            Self::Users => print_json(&client.all_profiles().await?),
            Self::Profile { command } => command.execute(client).await,
            Self::Posts { command } => command.execute(client).await,
            Self::Notifications { command } => command.execute(client).await,
            Self::Chat { command } => command.execute(client).await,
            Self::Skills { command } => command.execute(client).await,
            Self::Friends { command } => command.execute(client).await,
            Self::Theme { command } => command.execute(client),
        }
    }
}

impl ProfileCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Show { user_id: None } => print_json(&client.me().await?),
            Self::Show {
                user_id: Some(user_id),
            } => print_json(&client.user(user_id).await?),
            Self::Update {
                username,
                full_name,
                bio,
                role,
            } => {
                let update = ProfileUpdate {
                    username,
                    full_name,
                    bio,
                    role,
                };
                print_json(&client.update_profile(&update).await?)
            }
            Self::Avatar { url } => print_json(&client.set_profile_picture(&url).await?),
            Self::Cover { url } => print_json(&client.set_cover_image(&url).await?),
        }
    }
}

impl PostCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Feed => print_json(&client.posts().await?),
            Self::User { user_id } => print_json(&client.user_posts(user_id).await?),
            Self::Create { content, image_url } => {
                if content.trim().is_empty() {
                    bail!("Post content cannot be empty");
                }
                print_json(&client.create_post(&NewPost { content, image_url }).await?)
            }
            Self::Like { post_id } => print_json(&client.like_post(post_id).await?),
            Self::Unlike { post_id } => print_json(&client.unlike_post(post_id).await?),
            Self::Comment { post_id, content } => {
                print_json(&client.add_comment(post_id, &content).await?)
            }
            Self::Comments { post_id } => print_json(&client.comments(post_id).await?),
            Self::Reply {
                comment_id,
                content,
            } => print_json(&client.reply_to_comment(comment_id, &content).await?),
            Self::Share { post_id } => print_json(&client.share_post(post_id).await?),
            Self::View { post_id } => print_json(&client.record_view(post_id).await?),
            Self::Delete { post_id } => print_json(&client.delete_post(post_id).await?),
            Self::DeleteComment { comment_id } => {
                print_json(&client.delete_comment(comment_id).await?)
            }
            Self::Search { query, limit } => {
                print_json(&client.search_posts(&query, limit).await?)
            }
        }
    }
}

impl NotificationCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List { page } => print_json(&client.notifications(page.into()).await?),
            Self::Unread => print_json(&client.unread_count().await?),
            Self::Read { notification_id } => {
                print_json(&client.mark_notification_read(notification_id).await?)
            }
            Self::ReadAll => print_json(&client.mark_all_notifications_read().await?),
            Self::Delete { notification_id } => {
                print_json(&client.delete_notification(notification_id).await?)
            }
        }
    }
}

impl ChatCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Send {
                to_user_id,
                content,
            } => {
                let message = OutgoingMessage {
                    to_user_id: Id::from(to_user_id),
                    content,
                };
                print_json(&client.send_message(&message).await?)
            }
            Self::History { user_id } => print_json(&client.conversation(user_id).await?),
            Self::Conversations => print_json(&client.conversations().await?),
            Self::Read { user_id } => print_json(&client.mark_conversation_read(user_id).await?),
            Self::Watch => watch_messages(client).await,
        }
    }
}

async fn watch_messages(client: &ApiClient) -> Result<()> {
    let mut messages = client.message_stream().await?;
    info!("Listening for messages, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped listening");
                return Ok(());
            }
            next = messages.next() => match next {
                Some(message) => println!("{}", serde_json::to_string(&message?)?),
                None => {
                    warn!("Message stream closed by the server");
                    return Ok(());
                }
            },
        }
    }
}

impl SkillCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Mine => print_json(&client.my_skills().await?),
            Self::User { user_id } => print_json(&client.user_skills(user_id).await?),
            Self::Add { name, skill_type } => {
                let skill = NewSkill {
                    skill_name: name,
                    skill_type,
                };
                print_json(&client.add_skill(&skill).await?)
            }
            Self::Update {
                skill_id,
                name,
                skill_type,
            } => {
                let skill = NewSkill {
                    skill_name: name,
                    skill_type,
                };
                print_json(&client.update_skill(skill_id, &skill).await?)
            }
            Self::Remove { skill_id } => print_json(&client.delete_skill(skill_id).await?),
        }
    }
}

impl FriendCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List { all: true } => print_json(&client.friendships().await?),
            Self::List { all: false } => {
                let me = client.me().await?;
                let connections = client.friendships().await?;
                print_json(&connections.accepted_friends(me.id.as_ref()))
            }
            Self::Request { user_id } => {
                print_json(&client.send_friend_request(&Id::from(user_id)).await?)
            }
            Self::Incoming => print_json(&client.incoming_requests().await?),
            Self::Outgoing => print_json(&client.outgoing_requests().await?),
            Self::Accept { user_id } => print_json(&client.accept_friend_request(user_id).await?),
            Self::Reject { user_id } => print_json(&client.reject_friend_request(user_id).await?),
            Self::Remove { user_id } => print_json(&client.unfriend(user_id).await?),
            Self::Suggestions { page } => {
                print_json(&client.friend_suggestions(page.into()).await?)
            }
            Self::Status { user_id } => print_json(&client.friendship_status(user_id).await?),
        }
    }
}

impl ThemeCommands {
    pub fn execute(self, client: &ApiClient) -> Result<()> {
        let store = client.store().as_ref();
        let theme = match self {
            Self::Show => load_theme(store),
            Self::Toggle => toggle_theme(store)?,
            Self::Set { theme } => {
                store.store_theme(theme)?;
                theme
            }
        };
        println!("{theme}");
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
