mod embedding_test;
mod inactivity_test;
mod message_test;
mod storage_path_test;
