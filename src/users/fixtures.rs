use crate::users::repo_types::NewUser;

/// Seed users shared by repository and router tests, in insertion order.
pub fn fixture_users() -> Vec<NewUser> {
    vec![
        NewUser::new("test1", "test1@gmail.com", "pass1"),
        NewUser::new("test2", "test2@gmail.com", "pass2"),
        NewUser::new("test3", "test3@gmail.com", "pass3"),
        NewUser::new("abc", "abc@gmail.com", "abc123"),
    ]
}
