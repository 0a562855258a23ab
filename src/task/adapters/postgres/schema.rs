//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Store-assigned task identifier.
        id -> Int8,
        /// Unique task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Lifecycle status code.
        status -> Int2,
        /// Priority name.
        #[max_length = 16]
        priority -> Varchar,
        /// Difficulty name.
        #[max_length = 16]
        difficulty -> Varchar,
        /// Owning user.
        user_id -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// User accounts, read only for role resolution.
    users (id) {
        /// User identifier.
        id -> Int8,
        /// Role name.
        #[max_length = 32]
        role -> Varchar,
    }
}
