pub mod application {
    pub mod image {
        pub mod deadline;
        pub mod delete;
        pub mod upload;
        #[cfg(test)]
        pub mod test_support;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod shared {
        pub mod value_objects;
    }
    pub mod image {
        pub mod errors;
        pub mod model;
        pub mod progress;
        pub mod repository;
        pub mod services;
        pub mod use_cases {
            pub mod delete;
            pub mod upload;
        }
    }
}
