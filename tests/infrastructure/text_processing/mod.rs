mod composite_file_loader_test;
mod plain_text_adapter_test;
mod sentence_window_splitter_test;
