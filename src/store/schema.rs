// SQL statements for the users table

pub const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )";

pub const INSERT_USER: &str = "INSERT INTO users (name, email) VALUES (?1, ?2)";
pub const SELECT_ALL_USERS: &str = "SELECT id, name, email FROM users ORDER BY id";
pub const SELECT_USER_BY_ID: &str = "SELECT id, name, email FROM users WHERE id = ?1";
pub const UPDATE_USER: &str = "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3";
pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?1";
pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
pub const DELETE_ALL_USERS: &str = "DELETE FROM users";
/// `sqlite_sequence` exists because the table uses AUTOINCREMENT
pub const RESET_USER_SEQUENCE: &str = "DELETE FROM sqlite_sequence WHERE name = 'users'";

/// Demo users inserted by seeding and by `/reset`
pub const SAMPLE_USERS: &[(&str, &str)] = &[
    ("John Doe", "john@example.com"),
    ("Ankur Raval", "ankur@mail.com"),
    ("Sunny Shah", "sunny@example.com"),
    ("Pratham Shah", "pratham@example.com"),
];
