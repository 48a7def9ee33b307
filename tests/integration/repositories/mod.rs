mod listing_repository_test;
mod owner_repository_test;
