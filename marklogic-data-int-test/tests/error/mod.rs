mod error_translation_test;
