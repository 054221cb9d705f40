mod object_attachment_store_test;
