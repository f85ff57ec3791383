pub mod comment;
pub mod post;
pub mod user;
pub mod vote;

pub use comment::{Entity as Comment, Model as CommentModel};
pub use post::{Entity as Post, Model as PostModel};
pub use user::{Entity as User, Model as UserModel};
pub use vote::{Entity as Vote, Model as VoteModel};
