diesel::table! {
    Album (album_id) {
        album_id -> Text,
        name -> Text,
        description -> Text,
        release_date -> Text,
        tracks -> Text,
        revision -> BigInt,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}
