mod in_memory_conversation_repository_test;
mod pg_repository_test;
