use clap::{Parser, Subcommand};
use feed_client::{FeedClient, Post};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[clap(name = "feed", about = "Command line client for the social feed")]
struct Cli {
    #[clap(short, long, env = "FEED_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Overrides the token saved by `login`.
    #[clap(long, env = "FEED_TOKEN")]
    token: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Signup {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Posts {
        #[clap(long)]
        page: Option<u64>,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        #[clap(long)]
        image: String,
    },
    Edit {
        id: Uuid,
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        #[clap(long)]
        image: String,
    },
    Delete {
        id: Uuid,
    },
    Like {
        id: Uuid,
    },
    Unlike {
        id: Uuid,
    },
    Comment {
        post_id: Uuid,
        text: String,
    },
    EditComment {
        id: Uuid,
        text: String,
    },
    DeleteComment {
        id: Uuid,
    },
    /// Prints live feed events until interrupted.
    Watch {
        /// Stop after this many events.
        #[clap(long)]
        limit: Option<usize>,
    },
}

fn print_post(post: &Post) {
    println!("{post}");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut client = FeedClient::connect(&args.server)?;
    if let Some(token) = args.token {
        client = client.with_token(token);
    }

    match args.command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let created = client.signup(&name, &email, &password).await?;
            println!("{} (id {})", created.message, created.user_id);
        }
        Command::Login { email, password } => {
            let auth = client.login(&email, &password).await?;
            println!(
                "Logged in as {}, token valid for {}s",
                auth.user_id, auth.expires_in
            );
        }
        Command::Posts { page } => {
            let feed = client.list_posts(page).await?;
            println!(
                "Page {} of {} posts total",
                page.unwrap_or(1),
                feed.total_items
            );
            for post in &feed.posts {
                let marker = if feed.liked_posts.contains(&post.id) { "*" } else { "-" };
                println!("{marker} [{}] {} (by {})", post.id, post.title, post.creator.name);
            }
        }
        Command::Show { id } => {
            let detail = client.get_post(id).await?;
            print_post(&detail.post);
            if !detail.likers.is_empty() {
                let names: Vec<&str> = detail.likers.iter().map(|a| a.name.as_str()).collect();
                println!("    liked by: {}", names.join(", "));
            }
            for comment in &detail.comments {
                println!("    [{}] {}: {}", comment.id, comment.user.name, comment.comment);
            }
        }
        Command::Create {
            title,
            content,
            image,
        } => {
            let post = client.create_post(&title, &content, &image).await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::Edit {
            id,
            title,
            content,
            image,
        } => {
            let post = client.update_post(id, &title, &content, &image).await?;
            println!("Post updated:");
            print_post(&post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await?;
            println!("Post deleted!");
        }
        Command::Like { id } => {
            client.set_like(id, true).await?;
            println!("Liked {id}");
        }
        Command::Unlike { id } => {
            client.set_like(id, false).await?;
            println!("Unliked {id}");
        }
        Command::Comment { post_id, text } => {
            let comment = client.add_comment(post_id, &text).await?;
            println!("Comment created! ID: {}", comment.id);
        }
        Command::EditComment { id, text } => {
            let comment = client.edit_comment(id, &text).await?;
            println!("Comment updated: {}", comment.comment);
        }
        Command::DeleteComment { id } => {
            client.delete_comment(id).await?;
            println!("Comment deleted!");
        }
        Command::Watch { limit } => {
            let mut seen = 0usize;
            client
                .watch_events(|event| {
                    let payload = serde_json::to_string(&event.data).unwrap_or_default();
                    println!("{} {}", event.topic, payload);
                    seen += 1;
                    limit.is_none_or(|max| seen < max)
                })
                .await?;
        }
    }

    Ok(())
}
